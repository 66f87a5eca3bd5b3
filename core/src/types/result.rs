use crate::types::{Category, CategoryId};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Objects that carry a stable, not necessarily unique, string key.
pub trait Keyed: PartialEq {
    fn key(&self) -> &str;
}

/// A single backend result, already assigned to a category.
///
/// Two results are equal when uri, dnd uri, category id and every field match;
/// sharing a uri alone does not make them the same result.
#[derive(Debug, Clone)]
pub struct ScopeResult {
    uri: String,
    dnd_uri: String,
    category: Arc<Category>,
    fields: Map<String, Value>,
}

impl ScopeResult {
    pub fn new(category: Arc<Category>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            dnd_uri: String::new(),
            category,
            fields: Map::new(),
        }
    }

    pub fn with_dnd_uri(mut self, dnd_uri: impl Into<String>) -> Self {
        self.dnd_uri = dnd_uri.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn dnd_uri(&self) -> &str {
        &self.dnd_uri
    }

    pub fn category(&self) -> &Arc<Category> {
        &self.category
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category.id
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Flattened view handed to the UI for the `result` role.
    pub fn to_json(&self) -> Value {
        let mut obj = self.fields.clone();
        obj.insert("uri".to_string(), Value::String(self.uri.clone()));
        obj.insert("dnd_uri".to_string(), Value::String(self.dnd_uri.clone()));
        obj.insert(
            "category".to_string(),
            Value::String(self.category.id.to_string()),
        );
        Value::Object(obj)
    }
}

impl PartialEq for ScopeResult {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.dnd_uri == other.dnd_uri
            && self.category.id == other.category.id
            && self.fields == other.fields
    }
}

impl Keyed for ScopeResult {
    fn key(&self) -> &str {
        &self.uri
    }
}
