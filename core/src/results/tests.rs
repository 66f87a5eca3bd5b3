use super::*;
use crate::model::{ChangeLog, ModelChange};
use crate::template::ComponentsMapping;
use crate::types::{Category, CategoryId, ScopeResult};
use common::{category, result, result_with, uris};
use serde_json::json;
use std::sync::Arc;

mod common {
    use super::*;

    pub(super) fn category(id: &str) -> Arc<Category> {
        Arc::new(Category::new(CategoryId::try_from(id).unwrap(), id, "{}"))
    }

    pub(super) fn result(uri: &str) -> Arc<ScopeResult> {
        Arc::new(ScopeResult::new(category("cat1"), uri))
    }

    pub(super) fn result_with(uri: &str, field: &str, value: serde_json::Value) -> Arc<ScopeResult> {
        Arc::new(ScopeResult::new(category("cat1"), uri).with_field(field, value))
    }

    pub(super) fn uris(results: &[Arc<ScopeResult>]) -> Vec<&str> {
        results.iter().map(|r| r.uri()).collect()
    }
}

mod map {
    use super::*;

    #[test]
    fn test_find_disambiguates_same_key() {
        let a = result_with("x", "title", json!("A"));
        let b = result_with("x", "title", json!("B"));
        let map = ResultsMap::new(&[a.clone(), b.clone()]);

        assert_eq!(map.find(&a), Some(0));
        assert_eq!(map.find(&b), Some(1));
        assert_eq!(map.find(&result_with("x", "title", json!("C"))), None);
        assert_eq!(map.find(&result("y")), None);
    }

    #[test]
    fn test_find_uses_equality_not_identity() {
        let map = ResultsMap::new(&[result("a")]);

        assert_eq!(map.find(&result("a")), Some(0));
    }

    #[test]
    fn test_dedup_removes_only_exact_duplicates() {
        let mut items = vec![
            result("a"),
            result("a"),
            result_with("a", "title", json!("other")),
            result("b"),
            result("a"),
        ];

        let map = ResultsMap::dedup(&mut items);

        assert_eq!(items.len(), 3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.find(&result("b")), Some(2));
    }

    #[test]
    fn test_shift_moves_positions_in_range() {
        let items = vec![result("a"), result("b"), result("c")];
        let mut map = ResultsMap::new(&items);

        map.shift(1, 3, 2);

        assert_eq!(map.find(&items[0]), Some(0));
        assert_eq!(map.find(&items[1]), Some(3));
        assert_eq!(map.find(&items[2]), Some(4));
    }

    #[test]
    fn test_update_from_extends_prefix() {
        let items = vec![result("a"), result("b"), result("c")];
        let mut map = ResultsMap::new(&items[..1]);

        map.update_from(&items, 1);

        assert_eq!(map.len(), 3);
        assert_eq!(map.find(&items[2]), Some(2));
    }

    #[test]
    fn test_rebuild_replaces_entries() {
        let mut map = ResultsMap::new(&[result("a"), result("b")]);

        map.rebuild(&[result("b")]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.find(&result("a")), None);
        assert_eq!(map.find(&result("b")), Some(0));
    }

    #[test]
    fn test_get_returns_stored_instance() {
        let stored = result("a");
        let map = ResultsMap::new(std::slice::from_ref(&stored));

        assert!(Arc::ptr_eq(map.get(&result("a")).unwrap(), &stored));
    }
}

mod reconcile {
    use super::*;

    fn run(current: &mut Vec<Arc<ScopeResult>>, incoming: Vec<Arc<ScopeResult>>) -> (DiffStats, Vec<ModelChange>) {
        let mut changes = ChangeLog::new();
        let stats = super::reconcile(current, incoming, &mut changes);
        (stats, changes.take())
    }

    #[test]
    fn test_reconcile_same_sequence_is_noop() {
        let mut current = vec![result("a"), result("b"), result("c")];
        let incoming = vec![result("a"), result("b"), result("c")];

        let (stats, changes) = run(&mut current, incoming);

        assert!(stats.is_noop());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_reconcile_prefix_appends_once() {
        let mut current = vec![result("a")];

        let (stats, changes) = run(&mut current, vec![result("a"), result("b"), result("c")]);

        assert_eq!(uris(&current), vec!["a", "b", "c"]);
        assert_eq!(stats.inserted, 2);
        assert_eq!(changes, vec![ModelChange::Inserted { first: 1, last: 2 }]);
    }

    #[test]
    fn test_reconcile_to_empty() {
        let mut current = vec![result("a"), result("b")];

        let (stats, changes) = run(&mut current, Vec::new());

        assert!(current.is_empty());
        assert_eq!(stats.removed, 2);
        assert_eq!(changes, vec![ModelChange::Removed { first: 0, last: 1 }]);
    }

    #[test]
    fn test_reconcile_preserves_identity() {
        let a = result("a");
        let b = result("b");
        let mut current = vec![a.clone(), b.clone()];

        run(&mut current, vec![result("c"), result("b"), result("a")]);

        assert_eq!(uris(&current), vec!["c", "b", "a"]);
        assert!(Arc::ptr_eq(&current[1], &b));
        assert!(Arc::ptr_eq(&current[2], &a));
    }

    #[test]
    fn test_reconcile_duplicate_key_keeps_matching_instance() {
        let a = result_with("x", "title", json!("A"));
        let b = result_with("x", "title", json!("B"));
        let mut current = vec![a, b.clone()];

        let (stats, changes) = run(&mut current, vec![result_with("x", "title", json!("B"))]);

        assert_eq!(current.len(), 1);
        assert!(Arc::ptr_eq(&current[0], &b));
        assert_eq!(stats.inserted, 0);
        assert_eq!(changes, vec![ModelChange::Removed { first: 0, last: 0 }]);
    }

    #[test]
    fn test_reconcile_unequal_same_key_is_inserted() {
        let mut current = vec![result_with("x", "title", json!("A"))];

        let (stats, _) = run(
            &mut current,
            vec![
                result_with("x", "title", json!("A")),
                result_with("x", "title", json!("B")),
            ],
        );

        assert_eq!(current.len(), 2);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn test_reconcile_inserts_at_incoming_position() {
        let mut current = vec![result("a"), result("c")];

        let (_, changes) = run(&mut current, vec![result("a"), result("b"), result("c")]);

        assert_eq!(uris(&current), vec!["a", "b", "c"]);
        assert_eq!(changes, vec![ModelChange::Inserted { first: 1, last: 1 }]);
    }

    #[test]
    fn test_reconcile_reversed_uses_only_moves() {
        let forward: Vec<_> = (3..=7).map(|i| result(&format!("uri{i}"))).collect();
        let mut current = forward.clone();
        let reversed: Vec<_> = (3..=7).rev().map(|i| result(&format!("uri{i}"))).collect();

        let (stats, changes) = run(&mut current, reversed);

        assert_eq!(uris(&current), vec!["uri7", "uri6", "uri5", "uri4", "uri3"]);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.removed, 0);
        assert!(stats.moved > 0);
        assert!(changes.iter().all(|c| matches!(c, ModelChange::Moved { .. })));
        for original in &forward {
            assert!(current.iter().any(|r| Arc::ptr_eq(r, original)));
        }
    }

    #[test]
    fn test_reconcile_last_to_front_is_one_move() {
        let items: Vec<_> = (0..64).map(|i| result(&format!("uri{i}"))).collect();
        let mut current = items.clone();
        let mut incoming = items.clone();
        incoming.rotate_right(1);

        let (stats, changes) = run(&mut current, incoming.clone());

        assert_eq!(stats.moved, 1);
        assert_eq!(changes, vec![ModelChange::Moved { from: 63, to: 0 }]);
        assert!(current.iter().zip(&incoming).all(|(a, b)| Arc::ptr_eq(a, b)));
    }

    #[test]
    fn test_reconcile_mixed_operations() {
        let mut current = vec![result("a"), result("b"), result("c"), result("d")];

        run(
            &mut current,
            vec![result("d"), result("e"), result("b"), result("f")],
        );

        assert_eq!(uris(&current), vec!["d", "e", "b", "f"]);
    }

    #[test]
    fn test_reconcile_drops_incoming_duplicates() {
        let mut current = Vec::new();

        run(&mut current, (0..10).map(|_| result("same")).collect());

        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_reconcile_collapses_duplicates_in_current() {
        let mut current = vec![result("a"), result("a"), result("b")];

        run(&mut current, vec![result("b"), result("a")]);

        assert_eq!(uris(&current), vec!["b", "a"]);
    }
}

mod model {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> ComponentsMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_add_results_drops_identical_uris() {
        let mut model = ResultsModel::new();

        model.add_results((0..10).map(|_| result("uri")).collect());

        assert_eq!(model.count(), 1);
    }

    #[test]
    fn test_add_results_skips_already_present() {
        let mut model = ResultsModel::new();
        model.add_results(vec![result("a")]);
        model.take_changes();

        model.add_results(vec![result("a"), result("b")]);

        assert_eq!(uris(model.results()), vec!["a", "b"]);
        assert_eq!(
            model.take_changes(),
            vec![
                ModelChange::Inserted { first: 1, last: 1 },
                ModelChange::CountChanged
            ]
        );
    }

    #[test]
    fn test_add_update_results_reversed_keeps_count() {
        let mut model = ResultsModel::new();
        model.add_update_results((3..=7).map(|i| result(&format!("cat1_uri{i}"))).collect());
        model.take_changes();

        model.add_update_results((3..=7).rev().map(|i| result(&format!("cat1_uri{i}"))).collect());

        assert_eq!(model.count(), 5);
        assert_eq!(model.results()[0].uri(), "cat1_uri7");
        let changes = model.take_changes();
        assert!(changes.iter().all(|c| matches!(c, ModelChange::Moved { .. })));
    }

    #[test]
    fn test_clear_results() {
        let mut model = ResultsModel::new();
        model.add_results(vec![result("a"), result("b")]);
        model.take_changes();

        model.clear_results();

        assert!(model.is_empty());
        assert_eq!(
            model.take_changes(),
            vec![
                ModelChange::Removed { first: 0, last: 1 },
                ModelChange::CountChanged
            ]
        );
    }

    #[test]
    fn test_update_result_replaces_row() {
        let mut model = ResultsModel::new();
        model.add_results(vec![result("a"), result("b")]);
        model.take_changes();
        let updated = result_with("b", "title", json!("fresh"));

        assert!(model.update_result(&result("b"), updated.clone()));
        assert!(!model.update_result(&result("missing"), result("c")));

        assert!(Arc::ptr_eq(&model.results()[1], &updated));
        assert_eq!(
            model.take_changes(),
            vec![ModelChange::DataChanged {
                first: 1,
                last: 1,
                roles: vec![]
            }]
        );
    }

    #[test]
    fn test_component_roles_follow_mapping() {
        let mut model = ResultsModel::new();
        model.set_components_mapping(mapping(&[("title", "name"), ("art", "icon")]));
        model.add_results(vec![Arc::new(
            ScopeResult::new(category("cat1"), "file:///a")
                .with_field("name", "Song")
                .with_field("icon", "image://a")
                .with_field("subtitle", "unmapped"),
        )]);

        assert_eq!(model.data(0, Role::Title), Some(json!("Song")));
        assert_eq!(model.data(0, Role::Art), Some(json!("image://a")));
        assert_eq!(model.data(0, Role::Subtitle), None);
        assert_eq!(model.data(0, Role::Uri), Some(json!("file:///a")));
        assert_eq!(model.data(0, Role::CategoryId), Some(json!("cat1")));
        assert_eq!(model.data(1, Role::Uri), None);
    }

    #[test]
    fn test_non_string_component_is_none() {
        let mut model = ResultsModel::new();
        model.set_components_mapping(mapping(&[("title", "name")]));
        model.add_results(vec![result_with("a", "name", json!(42))]);

        assert_eq!(model.data(0, Role::Title), None);
    }

    #[test]
    fn test_attributes_filtered_and_capped() {
        let mut model = ResultsModel::new();
        model.set_components_mapping(mapping(&[("attributes", "attrs")]));
        model.set_max_attributes(2);
        model.add_results(vec![result_with(
            "a",
            "attrs",
            json!([
                {"value": "  "},
                "not a dict",
                {"value": "one"},
                {"icon": "no value"},
                {"value": "two", "style": "highlighted"},
                {"value": "three"}
            ]),
        )]);

        assert_eq!(
            model.data(0, Role::Attributes),
            Some(json!([
                {"value": "one", "style": "default"},
                {"value": "two", "style": "highlighted"}
            ]))
        );
    }

    #[test]
    fn test_background_uri_expanded() {
        let mut model = ResultsModel::new();
        model.set_components_mapping(mapping(&[("background", "bg")]));
        model.add_results(vec![result_with("a", "bg", json!("color:///red"))]);

        assert_eq!(
            model.data(0, Role::Background),
            Some(json!({"type": "color", "elements": ["red"]}))
        );
    }

    #[test]
    fn test_mapping_change_with_rows_resets() {
        let mut model = ResultsModel::new();
        model.set_components_mapping(mapping(&[("title", "name")]));
        assert!(model.take_changes().is_empty());

        model.add_results(vec![result("a")]);
        model.take_changes();
        model.set_components_mapping(mapping(&[("title", "label")]));

        assert_eq!(model.take_changes(), vec![ModelChange::Reset]);
    }

    #[test]
    fn test_get_skips_null_roles() {
        let mut model = ResultsModel::new();
        model.add_results(vec![result("a")]);

        let row = model.get(0);

        assert_eq!(row["uri"], json!("a"));
        assert!(row.contains_key("result"));
        assert!(!row.contains_key("title"));
    }
}
