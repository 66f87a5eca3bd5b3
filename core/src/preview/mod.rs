//! Preview widgets laid out over columns.

use crate::model::{ChangeLog, ModelChange, UpdateOutcome, sync_model};
use crate::types::{ColumnLayout, PreviewWidget, ScopeResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A widget whose attributes are resolved against the preview data and the
/// previewed result.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewWidgetData {
    pub id: String,
    pub widget_type: String,
    components: BTreeMap<String, String>,
    declared: Map<String, Value>,
    attributes: Map<String, Value>,
}

impl PreviewWidgetData {
    fn new(widget: &PreviewWidget) -> Self {
        Self {
            id: widget.id.clone(),
            widget_type: widget.widget_type.clone(),
            components: widget.components.clone(),
            declared: widget.attributes.clone(),
            attributes: Map::new(),
        }
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn components(&self) -> &BTreeMap<String, String> {
        &self.components
    }

    fn uses_field(&self, field: &str) -> bool {
        self.components.values().any(|f| f == field)
    }

    /// Preview data takes precedence over result fields; a component with
    /// neither resolves to null. Declared attributes win over components.
    fn resolved_attributes(&self, data: &HashMap<String, Value>, result: Option<&ScopeResult>) -> Map<String, Value> {
        let mut attributes = Map::new();
        for (name, field) in &self.components {
            let value = data
                .get(field)
                .or_else(|| result.and_then(|r| r.value(field)))
                .cloned()
                .unwrap_or(Value::Null);
            attributes.insert(name.clone(), value);
        }
        for (name, value) in &self.declared {
            attributes.insert(name.clone(), value.clone());
        }
        attributes
    }

    /// Re-resolves the attributes; returns whether they changed.
    fn resolve(&mut self, data: &HashMap<String, Value>, result: Option<&ScopeResult>) -> bool {
        let attributes = self.resolved_attributes(data, result);
        if attributes == self.attributes {
            return false;
        }
        self.attributes = attributes;
        true
    }
}

/// Widget ids shown in one column, in display order.
#[derive(Debug, Default)]
pub struct PreviewColumn {
    widget_ids: Vec<String>,
    changes: ChangeLog,
}

impl PreviewColumn {
    pub fn widget_ids(&self) -> &[String] {
        &self.widget_ids
    }

    pub fn count(&self) -> usize {
        self.widget_ids.len()
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }
}

/// Columns of preview widgets for the previewed result.
#[derive(Debug)]
pub struct PreviewModel {
    column_count: usize,
    columns: Vec<PreviewColumn>,
    layouts: HashMap<usize, Vec<Vec<String>>>,
    widgets: Vec<PreviewWidgetData>,
    data: HashMap<String, Value>,
    result: Option<Arc<ScopeResult>>,
    processing: bool,
    changes: ChangeLog,
}

impl Default for PreviewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewModel {
    /// Starts with a single column.
    pub fn new() -> Self {
        Self {
            column_count: 1,
            columns: vec![PreviewColumn::default()],
            layouts: HashMap::new(),
            widgets: Vec::new(),
            data: HashMap::new(),
            result: None,
            processing: false,
            changes: ChangeLog::new(),
        }
    }

    /// Widget ids per column. Without a layout for the current column count
    /// every widget goes into the first column in arrival order; with one,
    /// widgets the layout does not mention are not shown.
    fn column_plan(&self) -> Vec<Vec<String>> {
        let mut plan = vec![Vec::new(); self.column_count];
        match self.layouts.get(&self.column_count) {
            Some(layout) => {
                for (column, ids) in plan.iter_mut().zip(layout) {
                    column.extend(ids.iter().filter(|id| self.widget(id).is_some()).cloned());
                }
            }
            None => {
                if let Some(first) = plan.first_mut() {
                    first.extend(self.widgets.iter().map(|w| w.id.clone()));
                }
            }
        }
        plan
    }

    fn relayout(&mut self) {
        let plan = self.column_plan();
        for (column, ids) in self.columns.iter_mut().zip(&plan) {
            sync_model(
                ids,
                &mut column.widget_ids,
                &mut column.changes,
                |id| id.clone(),
                |id| id.clone(),
                |id| Some(id.clone()),
                |_, _| UpdateOutcome::Unchanged,
            );
        }
    }

    fn notify_widget_changed(&mut self, widget_id: &str, roles: Vec<&'static str>) {
        for column in &mut self.columns {
            if let Some(row) = column.widget_ids.iter().position(|id| id == widget_id) {
                column.changes.data_changed(row, roles.clone());
            }
        }
    }
}

/// Read operations.
impl PreviewModel {
    pub fn widget_column_count(&self) -> usize {
        self.column_count
    }

    pub fn column(&self, index: usize) -> Option<&PreviewColumn> {
        self.columns.get(index)
    }

    pub fn column_widgets(&self, index: usize) -> Vec<&PreviewWidgetData> {
        self.columns
            .get(index)
            .map(|c| c.widget_ids.iter().filter_map(|id| self.widget(id)).collect())
            .unwrap_or_default()
    }

    pub fn widgets(&self) -> &[PreviewWidgetData] {
        &self.widgets
    }

    pub fn widget(&self, id: &str) -> Option<&PreviewWidgetData> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn preview_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn result(&self) -> Option<&Arc<ScopeResult>> {
        self.result.as_ref()
    }

    pub fn processing(&self) -> bool {
        self.processing
    }

    /// Column insertions and removals.
    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }

    pub fn take_column_changes(&mut self, index: usize) -> Vec<ModelChange> {
        self.columns
            .get_mut(index)
            .map(PreviewColumn::take_changes)
            .unwrap_or_default()
    }
}

/// Mutation operations.
impl PreviewModel {
    pub fn set_result(&mut self, result: Arc<ScopeResult>) {
        self.result = Some(result);
        let changed: Vec<String> = self
            .widgets
            .iter_mut()
            .filter_map(|w| w.resolve(&self.data, self.result.as_deref()).then(|| w.id.clone()))
            .collect();
        for id in changed {
            self.notify_widget_changed(&id, vec!["properties"]);
        }
    }

    /// Returns false for zero or an unchanged count.
    pub fn set_widget_column_count(&mut self, count: usize) -> bool {
        if count == 0 || count == self.column_count {
            return false;
        }
        let old = self.column_count;
        self.column_count = count;
        if old < count {
            self.columns.resize_with(count, PreviewColumn::default);
            self.changes.inserted(old, count - 1);
        } else {
            self.columns.truncate(count);
            self.changes.removed(count, old - 1);
        }
        self.relayout();
        true
    }

    /// Stores layouts by their column count, replacing earlier ones.
    pub fn set_column_layouts(&mut self, layouts: &[ColumnLayout]) {
        if layouts.is_empty() {
            return;
        }
        for layout in layouts {
            self.layouts.insert(layout.column_count(), layout.columns.clone());
        }
        self.relayout();
    }

    /// Adds widgets. A widget whose id is already known is updated in place.
    /// Widgets without a type are ignored.
    pub fn add_widget_definitions(&mut self, widgets: &[PreviewWidget]) {
        let mut updated: Vec<(String, Vec<&'static str>)> = Vec::new();
        for widget in widgets {
            if widget.widget_type.is_empty() {
                tracing::warn!(id = %widget.id, "ignoring preview widget without a type");
                continue;
            }
            let mut data = PreviewWidgetData::new(widget);
            data.attributes = data.resolved_attributes(&self.data, self.result.as_deref());
            match self.widgets.iter_mut().find(|w| w.id == widget.id) {
                Some(existing) if *existing == data => {}
                Some(existing) => {
                    let mut roles = Vec::new();
                    if existing.widget_type != data.widget_type {
                        roles.push("type");
                    }
                    if existing.attributes != data.attributes {
                        roles.push("properties");
                    }
                    *existing = data;
                    updated.push((widget.id.clone(), roles));
                }
                None => self.widgets.push(data),
            }
        }
        self.relayout();
        for (id, roles) in updated {
            if !roles.is_empty() {
                self.notify_widget_changed(&id, roles);
            }
        }
    }

    /// Merges keyed preview data and refreshes the widgets reading any of it.
    pub fn update_preview_data(&mut self, data: Map<String, Value>) {
        let keys: Vec<String> = data.keys().cloned().collect();
        self.data.extend(data);
        let changed: Vec<String> = self
            .widgets
            .iter_mut()
            .filter(|w| keys.iter().any(|k| w.uses_field(k)))
            .filter_map(|w| w.resolve(&self.data, self.result.as_deref()).then(|| w.id.clone()))
            .collect();
        for id in changed {
            self.notify_widget_changed(&id, vec!["properties"]);
        }
    }

    /// Returns whether the flag changed.
    pub fn set_processing(&mut self, processing: bool) -> bool {
        if self.processing == processing {
            return false;
        }
        self.processing = processing;
        true
    }

    /// Drops widgets, layouts, data and the previewed result.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.layouts.clear();
        self.data.clear();
        self.result = None;
        self.relayout();
    }
}
