use crate::types::Keyed;
use std::collections::HashMap;
use std::sync::Arc;

struct Entry<T> {
    item: Arc<T>,
    index: usize,
}

/// Multimap from an item's key to every `(item, position)` sharing it.
///
/// Lookups disambiguate same-key entries by full equality, so distinct items
/// with colliding keys are tracked separately.
pub struct ResultsMap<T> {
    entries: HashMap<String, Vec<Entry<T>>>,
}

impl<T: Keyed> Default for ResultsMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

/// Construction.
impl<T: Keyed> ResultsMap<T> {
    pub fn new(items: &[Arc<T>]) -> Self {
        let mut map = Self::default();
        map.update_from(items, 0);
        map
    }

    /// Builds the map while dropping later exact duplicates from `items`.
    ///
    /// Items sharing a key but comparing unequal are all kept.
    pub fn dedup(items: &mut Vec<Arc<T>>) -> Self {
        let mut map = Self::default();
        let mut kept = 0;
        items.retain(|item| {
            if map.find(item).is_some() {
                return false;
            }
            map.push(item.clone(), kept);
            kept += 1;
            true
        });
        map
    }
}

/// Read operations.
impl<T: Keyed> ResultsMap<T> {
    /// Position of the first entry sharing `item`'s key that is fully equal to it.
    pub fn find(&self, item: &T) -> Option<usize> {
        self.entries
            .get(item.key())?
            .iter()
            .find(|e| *e.item == *item)
            .map(|e| e.index)
    }

    /// The stored instance equal to `item`, if any.
    pub fn get(&self, item: &T) -> Option<&Arc<T>> {
        self.entries
            .get(item.key())?
            .iter()
            .find(|e| *e.item == *item)
            .map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutation operations.
impl<T: Keyed> ResultsMap<T> {
    pub fn rebuild(&mut self, items: &[Arc<T>]) {
        self.entries.clear();
        self.update_from(items, 0);
    }

    /// Adds entries for `items[start..]` without touching existing ones.
    pub fn update_from(&mut self, items: &[Arc<T>], start: usize) {
        for (index, item) in items.iter().enumerate().skip(start) {
            self.push(item.clone(), index);
        }
    }

    /// Shifts recorded positions within `[start, end)` by `delta`.
    pub fn shift(&mut self, start: usize, end: usize, delta: isize) {
        for entry in self.entries.values_mut().flatten() {
            if (start..end).contains(&entry.index) {
                entry.index = entry.index.saturating_add_signed(delta);
            }
        }
    }

    fn push(&mut self, item: Arc<T>, index: usize) {
        self.entries
            .entry(item.key().to_string())
            .or_default()
            .push(Entry { item, index });
    }
}
