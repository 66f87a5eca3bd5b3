use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Widget ids per column for a given column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub columns: Vec<Vec<String>>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<Vec<String>>) -> Self {
        Self { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// A preview widget definition.
///
/// `components` maps a widget attribute name to the preview data key (or
/// result field) that supplies its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewWidget {
    pub id: String,
    pub widget_type: String,
    pub components: BTreeMap<String, String>,
    pub attributes: Map<String, Value>,
}

impl PreviewWidget {
    pub fn new(id: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            components: BTreeMap::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.components.insert(name.into(), field.into());
        self
    }
}
