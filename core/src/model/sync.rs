use crate::model::{ChangeLog, reorder};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Result of comparing an existing row against its incoming definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    /// Fields were updated in place; carries the changed role names.
    Updated(Vec<&'static str>),
    /// The row cannot be updated in place and must be recreated.
    Replace,
}

/// Makes `model` match `input` by key, preserving existing rows where possible.
///
/// Rows whose key vanished are removed, new keys are created at their input
/// position (a `None` from `create` skips the item), rows are moved into input
/// order, and surviving rows are passed to `update`. When `input` repeats a
/// key only its first occurrence counts.
pub fn sync_model<I, O, K>(
    input: &[I],
    model: &mut Vec<O>,
    changes: &mut ChangeLog,
    in_key: impl Fn(&I) -> K,
    out_key: impl Fn(&O) -> K,
    mut create: impl FnMut(&I) -> Option<O>,
    mut update: impl FnMut(&I, &mut O) -> UpdateOutcome,
) where
    K: Eq + Hash + Clone,
{
    let mut wanted: Vec<(K, &I)> = Vec::with_capacity(input.len());
    let mut by_key: HashMap<K, &I> = HashMap::with_capacity(input.len());
    for item in input {
        let key = in_key(item);
        if !by_key.contains_key(&key) {
            by_key.insert(key.clone(), item);
            wanted.push((key, item));
        }
    }

    // Removal. Duplicate keys already in the model go too.
    let mut old_keys: HashSet<K> = HashSet::with_capacity(model.len());
    let mut row = 0;
    while row < model.len() {
        let run = model[row..]
            .iter()
            .take_while(|o| {
                let key = out_key(o);
                !by_key.contains_key(&key) || old_keys.contains(&key)
            })
            .count();
        if run > 0 {
            model.drain(row..row + run);
            changes.removed(row, row + run - 1);
            continue;
        }
        old_keys.insert(out_key(&model[row]));
        row += 1;
    }

    // Insertion.
    let mut present: HashSet<K> = old_keys.clone();
    let mut row = 0;
    for (key, item) in &wanted {
        if !old_keys.contains(key) {
            match create(item) {
                Some(obj) => {
                    model.insert(row, obj);
                    changes.inserted(row, row);
                    present.insert(key.clone());
                }
                None => continue,
            }
        }
        row += 1;
    }

    // Move into final order, computed over the rows that actually exist.
    let final_pos: HashMap<K, usize> = wanted
        .iter()
        .filter(|(key, _)| present.contains(key))
        .enumerate()
        .map(|(pos, (key, _))| (key.clone(), pos))
        .collect();
    let dest = model
        .iter()
        .enumerate()
        .map(|(row, obj)| final_pos.get(&out_key(obj)).copied().unwrap_or(row))
        .collect();
    reorder(model, dest, changes);

    // In-place update of rows that existed before.
    for (row, obj) in model.iter_mut().enumerate() {
        let key = out_key(obj);
        if !old_keys.contains(&key) {
            continue;
        }
        let Some(item) = by_key.get(&key) else {
            continue;
        };
        match update(item, obj) {
            UpdateOutcome::Unchanged => {}
            UpdateOutcome::Updated(roles) => {
                if !roles.is_empty() {
                    changes.data_changed(row, roles);
                }
            }
            UpdateOutcome::Replace => match create(item) {
                Some(replacement) => {
                    *obj = replacement;
                    changes.data_changed(row, Vec::new());
                }
                None => tracing::warn!(row, "unable to recreate row, keeping previous instance"),
            },
        }
    }
}
