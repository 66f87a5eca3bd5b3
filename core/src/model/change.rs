/// A structural or data change observed on a list model.
///
/// Row ranges are inclusive. `Moved::to` follows list-model move semantics:
/// it is the row the item is inserted before, counted before removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChange {
    Inserted { first: usize, last: usize },
    Removed { first: usize, last: usize },
    Moved { from: usize, to: usize },
    /// An empty role list means every role may have changed.
    DataChanged {
        first: usize,
        last: usize,
        roles: Vec<&'static str>,
    },
    Reset,
    CountChanged,
}

/// Ordered queue of pending [`ModelChange`]s, drained by the UI.
#[derive(Debug, Default)]
pub struct ChangeLog {
    changes: Vec<ModelChange>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: ModelChange) {
        self.changes.push(change);
    }

    pub fn inserted(&mut self, first: usize, last: usize) {
        self.push(ModelChange::Inserted { first, last });
    }

    pub fn removed(&mut self, first: usize, last: usize) {
        self.push(ModelChange::Removed { first, last });
    }

    pub fn moved(&mut self, from: usize, to: usize) {
        self.push(ModelChange::Moved { from, to });
    }

    pub fn data_changed(&mut self, row: usize, roles: Vec<&'static str>) {
        self.push(ModelChange::DataChanged {
            first: row,
            last: row,
            roles,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn as_slice(&self) -> &[ModelChange] {
        &self.changes
    }

    pub fn take(&mut self) -> Vec<ModelChange> {
        std::mem::take(&mut self.changes)
    }
}
