use dash_core::model::{ChangeLog, ModelChange};
use dash_core::results::{ResultsModel, Role, reconcile};
use dash_core::types::{Category, CategoryId, ScopeResult};
use serde_json::Value;
use std::sync::Arc;

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn category() -> Arc<Category> {
    Arc::new(Category::new(CategoryId::try_from("cat").unwrap(), "Cat", "{}"))
}

/// Uris collide often and a `v` field makes same-uri results distinct.
fn batch(rng: &mut Lcg, category: &Arc<Category>) -> Vec<Arc<ScopeResult>> {
    let len = rng.next(24);
    (0..len)
        .map(|_| {
            let uri = format!("uri{}", rng.next(10));
            let v = rng.next(2);
            Arc::new(ScopeResult::new(Arc::clone(category), uri).with_field("v", v))
        })
        .collect()
}

fn dedup(items: &[Arc<ScopeResult>]) -> Vec<Arc<ScopeResult>> {
    let mut out: Vec<Arc<ScopeResult>> = Vec::new();
    for item in items {
        if !out.iter().any(|o| **o == **item) {
            out.push(Arc::clone(item));
        }
    }
    out
}

/// Applies a change log to a copy of the old rows; inserted rows become `None`.
fn replay(old: &[Arc<ScopeResult>], changes: &[ModelChange]) -> Vec<Option<Arc<ScopeResult>>> {
    let mut rows: Vec<Option<Arc<ScopeResult>>> = old.iter().cloned().map(Some).collect();
    for change in changes {
        match *change {
            ModelChange::Removed { first, last } => {
                rows.drain(first..=last);
            }
            ModelChange::Inserted { first, last } => {
                for row in first..=last {
                    rows.insert(row, None);
                }
            }
            ModelChange::Moved { from, to } => {
                let row = rows.remove(from);
                rows.insert(if to > from { to - 1 } else { to }, row);
            }
            _ => {}
        }
    }
    rows
}

/// Verify reconcile reaches the deduplicated target, keeps surviving instances,
/// and emits a change log that replays to the same rows.
#[test]
fn test_reconcile_matches_target_across_random_batches() {
    let category = category();
    let mut rng = Lcg(0x5eed);

    for _ in 0..500 {
        let mut current = Vec::new();
        reconcile(&mut current, batch(&mut rng, &category), &mut ChangeLog::new());
        let old = current.clone();
        let incoming = batch(&mut rng, &category);
        let expected = dedup(&incoming);
        let mut changes = ChangeLog::new();

        let stats = reconcile(&mut current, incoming, &mut changes);

        assert_eq!(current.len(), expected.len());
        for (got, want) in current.iter().zip(&expected) {
            assert_eq!(**got, **want);
        }
        for item in &current {
            if let Some(previous) = old.iter().find(|o| ***o == **item) {
                assert!(Arc::ptr_eq(previous, item));
            }
        }

        let replayed = replay(&old, changes.as_slice());
        assert_eq!(replayed.len(), current.len());
        for (slot, item) in replayed.iter().zip(&current) {
            match slot {
                Some(previous) => assert!(Arc::ptr_eq(previous, item)),
                None => assert!(!old.iter().any(|o| **o == **item)),
            }
        }
        let inserted = replayed.iter().filter(|s| s.is_none()).count();
        assert_eq!(stats.inserted, inserted);
    }
}

/// Verify a large reversed list is reordered purely with moves.
#[test]
fn test_reconcile_large_reversal() {
    let category = category();
    let items: Vec<_> = (0..2000)
        .map(|i| Arc::new(ScopeResult::new(Arc::clone(&category), format!("uri{i}"))))
        .collect();
    let mut current = items.clone();
    let reversed: Vec<_> = items.iter().rev().cloned().collect();
    let mut changes = ChangeLog::new();

    let stats = reconcile(&mut current, reversed.clone(), &mut changes);

    assert_eq!(stats.removed, 0);
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.moved, 1999);
    assert!(current.iter().zip(&reversed).all(|(a, b)| Arc::ptr_eq(a, b)));
}

fn numbered(category: &Arc<Category>, len: usize) -> Vec<Arc<ScopeResult>> {
    (0..len)
        .map(|i| Arc::new(ScopeResult::new(Arc::clone(category), format!("uri{i}"))))
        .collect()
}

/// Verify moving the last of many rows to the front costs a single move.
#[test]
fn test_reconcile_large_backward_move() {
    let category = category();
    let items = numbered(&category, 5000);
    let mut current = items.clone();
    let mut incoming = items.clone();
    incoming.rotate_right(1);
    let mut changes = ChangeLog::new();

    let stats = reconcile(&mut current, incoming.clone(), &mut changes);

    assert_eq!(stats.moved, 1);
    assert_eq!(changes.as_slice(), &[ModelChange::Moved { from: 4999, to: 0 }]);
    assert!(current.iter().zip(&incoming).all(|(a, b)| Arc::ptr_eq(a, b)));
}

/// Verify a shuffled list is reordered with fewer moves than rows and the
/// change log replays to the target order.
#[test]
fn test_reconcile_large_shuffle() {
    let category = category();
    let items = numbered(&category, 3000);
    let mut rng = Lcg(0xfeed);
    let mut incoming = items.clone();
    for i in (1..incoming.len()).rev() {
        let j = rng.next(i as u64 + 1) as usize;
        incoming.swap(i, j);
    }
    let mut current = items.clone();
    let mut changes = ChangeLog::new();

    let stats = reconcile(&mut current, incoming.clone(), &mut changes);

    assert_eq!(stats.removed, 0);
    assert_eq!(stats.inserted, 0);
    assert!(stats.moved < items.len());
    assert_eq!(changes.len(), stats.moved);
    assert!(current.iter().zip(&incoming).all(|(a, b)| Arc::ptr_eq(a, b)));
    let replayed = replay(&items, changes.as_slice());
    assert!(
        replayed
            .iter()
            .zip(&incoming)
            .all(|(slot, want)| slot.as_ref().is_some_and(|got| Arc::ptr_eq(got, want)))
    );
}

/// Verify an incremental search result update keeps the rows readable through roles.
#[test]
fn test_results_model_update_then_read_roles() {
    let category = category();
    let result = |uri: &str, title: &str| {
        Arc::new(
            ScopeResult::new(Arc::clone(&category), uri)
                .with_dnd_uri(format!("dnd:{uri}"))
                .with_field("title", title),
        )
    };
    let mut model = ResultsModel::new();
    model.set_components_mapping([("title".to_string(), "title".to_string())].into());
    model.add_results(vec![result("a", "A"), result("b", "B")]);
    model.take_changes();

    let stats = model.add_update_results(vec![result("b", "B"), result("c", "C")]);

    assert_eq!(stats.removed, 1);
    assert_eq!(stats.inserted, 1);
    assert_eq!(model.count(), 2);
    assert_eq!(model.data(1, Role::Title), Some(Value::from("C")));
    assert_eq!(model.data(0, Role::DndUri), Some(Value::from("dnd:b")));
    assert_eq!(model.data(5, Role::Uri), None);
    let row = model.get(0);
    assert_eq!(row["uri"], Value::from("b"));
    assert_eq!(row["categoryId"], Value::from("cat"));
}
