use crate::model::{ChangeLog, reorder};
use crate::results::ResultsMap;
use crate::types::Keyed;
use std::sync::Arc;

/// Counts of the structural operations one reconcile emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub removed: usize,
    pub inserted: usize,
    pub moved: usize,
}

impl DiffStats {
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0 && self.moved == 0
    }
}

/// Mutates `current` in place until it equals `incoming`, element for element.
///
/// Items present in both keep their existing `Arc`. Exact duplicates in
/// `incoming` are dropped first; same-key items that compare unequal are
/// distinct and are never merged.
pub fn reconcile<T: Keyed>(
    current: &mut Vec<Arc<T>>,
    mut incoming: Vec<Arc<T>>,
    changes: &mut ChangeLog,
) -> DiffStats {
    let target = ResultsMap::dedup(&mut incoming);
    let mut stats = DiffStats::default();

    // Current is a prefix of incoming: one append.
    if current.len() <= incoming.len()
        && current.iter().zip(&incoming).all(|(a, b)| **a == **b)
    {
        let start = current.len();
        if incoming.len() > start {
            current.extend(incoming.drain(start..));
            changes.inserted(start, current.len() - 1);
            stats.inserted = current.len() - start;
        }
        return stats;
    }

    // Removal. Each incoming slot can be claimed by one current item only.
    let mut claimed = vec![false; incoming.len()];
    let mut row = 0;
    while row < current.len() {
        let run = current[row..]
            .iter()
            .take_while(|item| match target.find(item) {
                Some(pos) if !claimed[pos] => false,
                _ => true,
            })
            .count();
        if run > 0 {
            current.drain(row..row + run);
            changes.removed(row, row + run - 1);
            stats.removed += run;
            continue;
        }
        if let Some(pos) = target.find(&current[row]) {
            claimed[pos] = true;
        }
        row += 1;
    }

    // Insertion at each new item's incoming position.
    let mut index = ResultsMap::new(current);
    for (pos, item) in incoming.iter().enumerate() {
        if index.find(item).is_some() {
            continue;
        }
        current.insert(pos, item.clone());
        changes.inserted(pos, pos);
        stats.inserted += 1;
        index.shift(pos, usize::MAX, 1);
        index.update_from(&current[..=pos], pos);
    }

    // Moves. Every item is in `incoming` now, so destinations form a permutation.
    let dest = current
        .iter()
        .enumerate()
        .map(|(row, item)| target.find(item).unwrap_or(row))
        .collect();
    stats.moved = reorder(current, dest, changes);

    tracing::trace!(
        removed = stats.removed,
        inserted = stats.inserted,
        moved = stats.moved,
        "reconciled ordered list"
    );
    stats
}
