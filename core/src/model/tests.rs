use super::*;
use common::{Row, apply, ids, replay, rows, shuffled, sync_numbers};

mod common {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(super) struct Row {
        pub(super) id: String,
        pub(super) label: String,
        pub(super) serial: usize,
    }

    pub(super) fn rows(items: &[(&str, &str)]) -> Vec<Row> {
        items
            .iter()
            .enumerate()
            .map(|(serial, (id, label))| Row {
                id: id.to_string(),
                label: label.to_string(),
                serial,
            })
            .collect()
    }

    pub(super) fn ids(model: &[Row]) -> Vec<&str> {
        model.iter().map(|r| r.id.as_str()).collect()
    }

    /// Syncs `(id, label)` input into `model`; labels are updated in place and
    /// creates for ids starting with `!` fail.
    pub(super) fn apply(input: &[(&str, &str)], model: &mut Vec<Row>) -> Vec<ModelChange> {
        let mut changes = ChangeLog::new();
        sync_model(
            input,
            model,
            &mut changes,
            |(id, _)| id.to_string(),
            |row| row.id.clone(),
            |(id, label)| {
                (!id.starts_with('!')).then(|| Row {
                    id: id.to_string(),
                    label: label.to_string(),
                    serial: 100,
                })
            },
            |(_, label), row| {
                if row.label == *label {
                    UpdateOutcome::Unchanged
                } else {
                    row.label = label.to_string();
                    UpdateOutcome::Updated(vec!["label"])
                }
            },
        );
        changes.take()
    }

    /// Syncs plain numbers, keyed by value; returns the emitted changes.
    pub(super) fn sync_numbers(input: &[usize], model: &mut Vec<usize>) -> Vec<ModelChange> {
        let mut changes = ChangeLog::new();
        sync_model(
            input,
            model,
            &mut changes,
            |n| *n,
            |n| *n,
            |n| Some(*n),
            |_, _| UpdateOutcome::Unchanged,
        );
        changes.take()
    }

    /// `0..len` in a fixed pseudo-random order.
    pub(super) fn shuffled(len: usize, mut seed: u64) -> Vec<usize> {
        let mut items: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            items.swap(i, (seed >> 33) as usize % (i + 1));
        }
        items
    }

    /// Applies moves to `rows` the way a list view would.
    pub(super) fn replay(mut rows: Vec<usize>, changes: &[ModelChange]) -> Vec<usize> {
        for change in changes {
            if let ModelChange::Moved { from, to } = *change {
                let row = rows.remove(from);
                rows.insert(if to > from { to - 1 } else { to }, row);
            }
        }
        rows
    }
}

mod sync {
    use super::*;

    #[test]
    fn test_sync_into_empty_model() {
        let mut model = Vec::new();

        let changes = apply(&[("a", "A"), ("b", "B")], &mut model);

        assert_eq!(ids(&model), vec!["a", "b"]);
        assert_eq!(
            changes,
            vec![
                ModelChange::Inserted { first: 0, last: 0 },
                ModelChange::Inserted { first: 1, last: 1 },
            ]
        );
    }

    #[test]
    fn test_sync_identical_input_is_noop() {
        let mut model = rows(&[("a", "A"), ("b", "B"), ("c", "C")]);

        let changes = apply(&[("a", "A"), ("b", "B"), ("c", "C")], &mut model);

        assert!(changes.is_empty());
        assert_eq!(model, rows(&[("a", "A"), ("b", "B"), ("c", "C")]));
    }

    #[test]
    fn test_sync_removes_contiguous_run_once() {
        let mut model = rows(&[("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]);

        let changes = apply(&[("a", "A"), ("d", "D")], &mut model);

        assert_eq!(ids(&model), vec!["a", "d"]);
        assert_eq!(changes, vec![ModelChange::Removed { first: 1, last: 2 }]);
    }

    #[test]
    fn test_sync_updates_in_place() {
        let mut model = rows(&[("a", "A"), ("b", "B")]);

        let changes = apply(&[("a", "A"), ("b", "Bee")], &mut model);

        assert_eq!(model[1].label, "Bee");
        assert_eq!(model[1].serial, 1);
        assert_eq!(
            changes,
            vec![ModelChange::DataChanged {
                first: 1,
                last: 1,
                roles: vec!["label"]
            }]
        );
    }

    #[test]
    fn test_sync_reorders_with_moves() {
        let mut model = rows(&[("a", "A"), ("b", "B"), ("c", "C")]);

        let changes = apply(&[("c", "C"), ("a", "A"), ("b", "B")], &mut model);

        assert_eq!(ids(&model), vec!["c", "a", "b"]);
        assert!(changes.iter().all(|c| matches!(c, ModelChange::Moved { .. })));
        // existing rows keep their instances
        assert_eq!(model[0].serial, 2);
    }

    #[test]
    fn test_sync_move_destination_follows_list_semantics() {
        let mut model = rows(&[("a", "A"), ("b", "B")]);

        let changes = apply(&[("b", "B"), ("a", "A")], &mut model);

        assert_eq!(changes, vec![ModelChange::Moved { from: 0, to: 2 }]);
    }

    #[test]
    fn test_sync_failed_create_does_not_break_order() {
        let mut model = rows(&[("a", "A"), ("b", "B")]);

        let changes = apply(&[("b", "B"), ("!x", "X"), ("c", "C"), ("a", "A")], &mut model);

        assert_eq!(ids(&model), vec!["b", "c", "a"]);
        assert!(
            !changes
                .iter()
                .any(|c| matches!(c, ModelChange::Removed { .. }))
        );
    }

    #[test]
    fn test_sync_duplicate_input_keys_keep_first() {
        let mut model = Vec::new();

        apply(&[("a", "first"), ("b", "B"), ("a", "second")], &mut model);

        assert_eq!(ids(&model), vec!["a", "b"]);
        assert_eq!(model[0].label, "first");
    }

    #[test]
    fn test_sync_to_empty_input_clears() {
        let mut model = rows(&[("a", "A"), ("b", "B")]);

        let changes = apply(&[], &mut model);

        assert!(model.is_empty());
        assert_eq!(changes, vec![ModelChange::Removed { first: 0, last: 1 }]);
    }

    #[test]
    fn test_sync_replace_recreates_row() {
        let mut model = rows(&[("a", "A")]);
        let mut changes = ChangeLog::new();

        sync_model(
            &["a"],
            &mut model,
            &mut changes,
            |id| id.to_string(),
            |row| row.id.clone(),
            |id| {
                Some(Row {
                    id: id.to_string(),
                    label: "new".to_string(),
                    serial: 7,
                })
            },
            |_, _| UpdateOutcome::Replace,
        );

        assert_eq!(model[0].serial, 7);
        assert_eq!(
            changes.take(),
            vec![ModelChange::DataChanged {
                first: 0,
                last: 0,
                roles: vec![]
            }]
        );
    }
}

mod reorder {
    use super::*;

    #[test]
    fn test_last_row_to_front_is_one_move() {
        let mut model: Vec<usize> = (0..64).collect();
        let mut input = model.clone();
        input.rotate_right(1);

        let changes = sync_numbers(&input, &mut model);

        assert_eq!(model, input);
        assert_eq!(changes, vec![ModelChange::Moved { from: 63, to: 0 }]);
    }

    #[test]
    fn test_first_row_to_back_is_one_move() {
        let mut model: Vec<usize> = (0..64).collect();
        let mut input = model.clone();
        input.rotate_left(1);

        let changes = sync_numbers(&input, &mut model);

        assert_eq!(model, input);
        assert_eq!(changes, vec![ModelChange::Moved { from: 0, to: 64 }]);
    }

    #[test]
    fn test_large_shuffle_moves_each_row_at_most_once() {
        let len = 3000;
        let original: Vec<usize> = (0..len).collect();
        let mut model = original.clone();
        let input = shuffled(len, 0x5eed);

        let changes = sync_numbers(&input, &mut model);

        assert_eq!(model, input);
        assert!(changes.len() < len);
        assert!(changes.iter().all(|c| matches!(c, ModelChange::Moved { .. })));
        assert_eq!(replay(original, &changes), input);
    }

    #[test]
    fn test_moves_skip_rows_already_in_order() {
        let mut model = vec![0, 1, 2, 3, 4, 5];

        let changes = sync_numbers(&[1, 2, 0, 3, 5, 4], &mut model);

        assert_eq!(model, vec![1, 2, 0, 3, 5, 4]);
        assert_eq!(changes.len(), 2);
    }
}

mod change_log {
    use super::*;

    #[test]
    fn test_take_drains_queue() {
        let mut log = ChangeLog::new();
        log.inserted(0, 2);
        log.push(ModelChange::CountChanged);

        assert_eq!(log.len(), 2);
        assert_eq!(log.take().len(), 2);
        assert!(log.is_empty());
    }
}
