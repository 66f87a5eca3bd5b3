use crate::model::{ChangeLog, ModelChange};
use crate::results::{DiffStats, ResultsMap, reconcile};
use crate::template::{ComponentsMapping, DEFAULT_MAX_ATTRIBUTES, expand_background_uri};
use crate::types::{CategoryId, ScopeResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Display roles exposed per result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Uri,
    CategoryId,
    DndUri,
    Result,
    Title,
    Art,
    Subtitle,
    Mascot,
    Emblem,
    Summary,
    Attributes,
    Background,
}

impl Role {
    pub const ALL: [Role; 12] = [
        Role::Uri,
        Role::CategoryId,
        Role::DndUri,
        Role::Result,
        Role::Title,
        Role::Art,
        Role::Subtitle,
        Role::Mascot,
        Role::Emblem,
        Role::Summary,
        Role::Attributes,
        Role::Background,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Uri => "uri",
            Role::CategoryId => "categoryId",
            Role::DndUri => "dndUri",
            Role::Result => "result",
            Role::Title => "title",
            Role::Art => "art",
            Role::Subtitle => "subtitle",
            Role::Mascot => "mascot",
            Role::Emblem => "emblem",
            Role::Summary => "summary",
            Role::Attributes => "attributes",
            Role::Background => "background",
        }
    }

    /// Component name in the category template, for roles backed by one.
    fn component(self) -> Option<&'static str> {
        match self {
            Role::Title => Some("title"),
            Role::Art => Some("art"),
            Role::Subtitle => Some("subtitle"),
            Role::Mascot => Some("mascot"),
            Role::Emblem => Some("emblem"),
            Role::Summary => Some("summary"),
            Role::Attributes => Some("attributes"),
            Role::Background => Some("background"),
            _ => None,
        }
    }
}

/// Ordered results of one category.
pub struct ResultsModel {
    category_id: Option<CategoryId>,
    results: Vec<Arc<ScopeResult>>,
    mapping: ComponentsMapping,
    max_attributes: usize,
    changes: ChangeLog,
}

impl Default for ResultsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsModel {
    pub fn new() -> Self {
        Self {
            category_id: None,
            results: Vec::new(),
            mapping: ComponentsMapping::new(),
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            changes: ChangeLog::new(),
        }
    }
}

/// Read operations.
impl ResultsModel {
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_id.as_ref()
    }

    pub fn count(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[Arc<ScopeResult>] {
        &self.results
    }

    pub fn result_at(&self, row: usize) -> Option<&Arc<ScopeResult>> {
        self.results.get(row)
    }

    pub fn components_mapping(&self) -> &ComponentsMapping {
        &self.mapping
    }

    pub fn max_attributes(&self) -> usize {
        self.max_attributes
    }

    /// Value of `role` for the row, `None` when out of range or unmapped.
    pub fn data(&self, row: usize, role: Role) -> Option<Value> {
        let result = self.results.get(row)?;
        match role {
            Role::Uri => Some(Value::String(result.uri().to_string())),
            Role::CategoryId => Some(Value::String(result.category_id().to_string())),
            Role::DndUri => Some(Value::String(result.dnd_uri().to_string())),
            Role::Result => Some(result.to_json()),
            Role::Attributes => self.attributes_value(result),
            Role::Background => self
                .component_value(result, "background")
                .map(|uri| expand_background_uri(&uri)),
            other => other
                .component()
                .and_then(|c| self.component_value(result, c))
                .map(Value::String),
        }
    }

    /// Every non-null role of the row keyed by role name.
    pub fn get(&self, row: usize) -> Map<String, Value> {
        Role::ALL
            .iter()
            .filter_map(|role| Some((role.name().to_string(), self.data(row, *role)?)))
            .collect()
    }

    fn component_value(&self, result: &ScopeResult, component: &str) -> Option<String> {
        let field = self.mapping.get(component)?;
        result.value(field)?.as_str().map(str::to_string)
    }

    /// Attribute dicts with a non-blank `value`, `style` defaulted, capped at the max count.
    fn attributes_value(&self, result: &ScopeResult) -> Option<Value> {
        let field = self.mapping.get("attributes")?;
        let Value::Array(items) = result.value(field)? else {
            return None;
        };
        let attributes = items
            .iter()
            .filter_map(Value::as_object)
            .filter(|attr| match attr.get("value") {
                None => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            })
            .map(|attr| {
                let mut attr = attr.clone();
                attr.entry("style")
                    .or_insert_with(|| Value::String("default".to_string()));
                Value::Object(attr)
            })
            .take(self.max_attributes)
            .collect();
        Some(Value::Array(attributes))
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }
}

/// Mutation operations.
impl ResultsModel {
    pub fn set_category_id(&mut self, id: CategoryId) {
        self.category_id = Some(id);
    }

    /// Replacing the mapping while rows exist resets the model.
    pub fn set_components_mapping(&mut self, mapping: ComponentsMapping) {
        if mapping == self.mapping {
            return;
        }
        self.mapping = mapping;
        if !self.results.is_empty() {
            self.changes.push(ModelChange::Reset);
        }
    }

    pub fn set_max_attributes(&mut self, max_attributes: usize) {
        self.max_attributes = max_attributes;
    }

    /// Appends results not already shown; exact duplicates are dropped.
    pub fn add_results(&mut self, mut batch: Vec<Arc<ScopeResult>>) {
        ResultsMap::dedup(&mut batch);
        let existing = ResultsMap::new(&self.results);
        batch.retain(|r| existing.find(r).is_none());
        if batch.is_empty() {
            return;
        }

        let first = self.results.len();
        self.results.extend(batch);
        self.changes.inserted(first, self.results.len() - 1);
        self.changes.push(ModelChange::CountChanged);
    }

    /// Reconciles the rows against `batch` with minimal remove/insert/move operations.
    pub fn add_update_results(&mut self, batch: Vec<Arc<ScopeResult>>) -> DiffStats {
        let before = self.results.len();
        let stats = reconcile(&mut self.results, batch, &mut self.changes);
        if self.results.len() != before {
            self.changes.push(ModelChange::CountChanged);
        }
        stats
    }

    /// Swaps the row holding `old` for `updated`. Returns false when `old` is not shown.
    pub fn update_result(&mut self, old: &ScopeResult, updated: Arc<ScopeResult>) -> bool {
        let Some(row) = self.results.iter().position(|r| **r == *old) else {
            return false;
        };
        self.results[row] = updated;
        self.changes.data_changed(row, Vec::new());
        true
    }

    pub fn clear_results(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.changes.removed(0, self.results.len() - 1);
        self.results.clear();
        self.changes.push(ModelChange::CountChanged);
    }
}
