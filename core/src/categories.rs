//! Category registry.
//!
//! Keeps categories in first-seen order, routes each one to its own
//! [`ResultsModel`], and purges categories a new search generation left unused.

use crate::model::{ChangeLog, ModelChange};
use crate::results::ResultsModel;
use crate::template::{CategoryTemplate, TemplateDefaults};
use crate::types::{Category, CategoryId};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_MAX_CATEGORIES: usize = 32;

/// Per-row roles of the categories list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryRole {
    CategoryId,
    Name,
    Icon,
    RawRendererTemplate,
    Renderer,
    Components,
    HeaderLink,
    Count,
}

impl CategoryRole {
    pub fn name(self) -> &'static str {
        match self {
            CategoryRole::CategoryId => "categoryId",
            CategoryRole::Name => "name",
            CategoryRole::Icon => "icon",
            CategoryRole::RawRendererTemplate => "rawRendererTemplate",
            CategoryRole::Renderer => "renderer",
            CategoryRole::Components => "components",
            CategoryRole::HeaderLink => "headerLink",
            CategoryRole::Count => "count",
        }
    }
}

enum Source {
    Backend(Arc<Category>),
    /// Provided by the shell itself; its count comes from outside.
    Special {
        id: CategoryId,
        title: String,
        icon: String,
        count: usize,
    },
}

struct Entry {
    source: Source,
    template: CategoryTemplate,
    results: Option<ResultsModel>,
    generation: u64,
}

impl Entry {
    fn id(&self) -> &CategoryId {
        match &self.source {
            Source::Backend(c) => &c.id,
            Source::Special { id, .. } => id,
        }
    }

    fn title(&self) -> &str {
        match &self.source {
            Source::Backend(c) => &c.title,
            Source::Special { title, .. } => title,
        }
    }

    fn icon(&self) -> &str {
        match &self.source {
            Source::Backend(c) => &c.icon,
            Source::Special { icon, .. } => icon,
        }
    }

    fn header_link(&self) -> String {
        match &self.source {
            Source::Backend(c) => c.header_link(),
            Source::Special { .. } => String::new(),
        }
    }

    fn is_special(&self) -> bool {
        matches!(self.source, Source::Special { .. })
    }

    fn count(&self) -> usize {
        match (&self.source, &self.results) {
            (Source::Special { count, .. }, _) => *count,
            (_, Some(model)) => model.count(),
            (_, None) => 0,
        }
    }

    fn apply_template_to_model(&mut self) {
        if let Some(model) = self.results.as_mut() {
            model.set_components_mapping(self.template.components_mapping());
            model.set_max_attributes(self.template.max_attributes());
        }
    }

    /// Adopts a re-announced category, returning the roles that changed.
    fn update_from(&mut self, category: Arc<Category>, defaults: &TemplateDefaults) -> Vec<&'static str> {
        let mut roles = Vec::new();
        if category.title != self.title() {
            roles.push(CategoryRole::Name.name());
        }
        if category.icon != self.icon() {
            roles.push(CategoryRole::Icon.name());
        }
        if category.header_link() != self.header_link() {
            roles.push(CategoryRole::HeaderLink.name());
        }
        if category.renderer_template != self.template.raw {
            roles.push(CategoryRole::RawRendererTemplate.name());
            let template = defaults.resolve(&category.renderer_template);
            if template.renderer != self.template.renderer {
                roles.push(CategoryRole::Renderer.name());
            }
            if template.components != self.template.components {
                roles.push(CategoryRole::Components.name());
            }
            self.template = template;
        }
        self.source = Source::Backend(category);
        if !roles.is_empty() {
            self.apply_template_to_model();
        }
        roles
    }
}

pub struct Categories {
    defaults: Arc<TemplateDefaults>,
    entries: Vec<Entry>,
    generation: u64,
    max_categories: usize,
    changes: ChangeLog,
}

impl Categories {
    pub fn new(defaults: Arc<TemplateDefaults>, max_categories: usize) -> Self {
        Self {
            defaults,
            entries: Vec::new(),
            generation: 0,
            max_categories,
            changes: ChangeLog::new(),
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id().as_str() == id)
    }

    /// First non-special category without results, or the end of the list.
    fn first_empty_index(&self) -> usize {
        self.entries
            .iter()
            .position(|e| !e.is_special() && e.count() == 0)
            .unwrap_or(self.entries.len())
    }
}

/// Read operations.
impl Categories {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn category_ids(&self) -> Vec<&CategoryId> {
        self.entries.iter().map(Entry::id).collect()
    }

    pub fn index_of_category(&self, id: &str) -> Option<usize> {
        self.index_of(id)
    }

    pub fn lookup_category(&self, id: &str) -> Option<&ResultsModel> {
        self.index_of(id)
            .and_then(|i| self.entries[i].results.as_ref())
    }

    pub fn lookup_category_mut(&mut self, id: &str) -> Option<&mut ResultsModel> {
        let i = self.index_of(id)?;
        self.entries[i].results.as_mut()
    }

    pub fn results_at(&self, row: usize) -> Option<&ResultsModel> {
        self.entries.get(row)?.results.as_ref()
    }

    pub fn results_at_mut(&mut self, row: usize) -> Option<&mut ResultsModel> {
        self.entries.get_mut(row)?.results.as_mut()
    }

    pub fn data(&self, row: usize, role: CategoryRole) -> Option<Value> {
        let entry = self.entries.get(row)?;
        let value = match role {
            CategoryRole::CategoryId => Value::String(entry.id().to_string()),
            CategoryRole::Name => Value::String(entry.title().to_string()),
            CategoryRole::Icon => Value::String(entry.icon().to_string()),
            CategoryRole::RawRendererTemplate => Value::String(entry.template.raw.clone()),
            CategoryRole::Renderer => entry.template.renderer.clone(),
            CategoryRole::Components => entry.template.components.clone(),
            CategoryRole::HeaderLink => Value::String(entry.header_link()),
            CategoryRole::Count => Value::from(entry.count()),
        };
        Some(value)
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }
}

/// Mutation operations.
impl Categories {
    /// Registers `category`, or refreshes it if already known.
    ///
    /// New categories go to the first empty slot. A known category that sits
    /// after an empty slot is moved up to it. `model` is used for a new
    /// category when given, otherwise a fresh one is created.
    pub fn register_category(&mut self, category: Arc<Category>, model: Option<ResultsModel>) -> &mut ResultsModel {
        let empty_index = self.first_empty_index();
        let generation = self.generation;

        let row = match self.index_of(category.id.as_str()) {
            Some(index) if empty_index < index => {
                let mut entry = self.entries.remove(index);
                self.changes.removed(index, index);
                entry.update_from(category, &self.defaults);
                entry.generation = generation;
                self.entries.insert(empty_index, entry);
                self.changes.inserted(empty_index, empty_index);
                empty_index
            }
            Some(index) => {
                let entry = &mut self.entries[index];
                let roles = entry.update_from(category, &self.defaults);
                entry.generation = generation;
                if !roles.is_empty() {
                    self.changes.data_changed(index, roles);
                }
                index
            }
            None => {
                let template = self.defaults.resolve(&category.renderer_template);
                let mut model = model.unwrap_or_default();
                model.set_category_id(category.id.clone());
                let mut entry = Entry {
                    source: Source::Backend(category),
                    template,
                    results: Some(model),
                    generation,
                };
                entry.apply_template_to_model();
                self.entries.insert(empty_index, entry);
                self.changes.inserted(empty_index, empty_index);
                empty_index
            }
        };

        self.entries[row]
            .results
            .get_or_insert_with(ResultsModel::new)
    }

    /// Emits a count change for the category's row.
    pub fn update_result_count(&mut self, id: &str) {
        match self.index_of(id) {
            Some(row) => self.changes.data_changed(row, vec![CategoryRole::Count.name()]),
            None => tracing::warn!(category = id, "unable to update results count"),
        }
    }

    /// Starts a new search generation; categories not re-registered in it are purged.
    pub fn mark_new_search(&mut self) {
        self.generation += 1;
    }

    /// Clears categories unused in the current generation, then drops the
    /// oldest empty unused category if the live count exceeds the ceiling.
    ///
    /// At most one category is dropped per call.
    pub fn purge_results(&mut self) {
        let generation = self.generation;
        for row in 0..self.entries.len() {
            let entry = &mut self.entries[row];
            if entry.is_special() || entry.generation >= generation {
                continue;
            }
            if let Some(model) = entry.results.as_mut()
                && !model.is_empty()
            {
                model.clear_results();
                self.changes.data_changed(row, vec![CategoryRole::Count.name()]);
            }
        }

        let live = self.entries.iter().filter(|e| !e.is_special()).count();
        if live <= self.max_categories {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_special() && e.generation < generation && e.count() == 0)
            .min_by_key(|(_, e)| e.generation)
            .map(|(row, _)| row);
        if let Some(row) = oldest {
            tracing::debug!(category = %self.entries[row].id(), "purging unused category");
            self.entries.remove(row);
            self.changes.removed(row, row);
        }
    }

    /// Clears every results model, keeping the categories themselves.
    pub fn clear_all(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        for model in self.entries.iter_mut().filter_map(|e| e.results.as_mut()) {
            model.clear_results();
        }
        self.changes.push(ModelChange::DataChanged {
            first: 0,
            last: self.entries.len() - 1,
            roles: vec![CategoryRole::Count.name()],
        });
    }

    /// Replaces a category's renderer template at runtime.
    ///
    /// Returns false for an unknown category or a template that does not parse.
    pub fn override_category_json(&mut self, id: &str, json: &str) -> bool {
        let Some(row) = self.index_of(id) else {
            return false;
        };
        let template = match self.defaults.parse(json) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!(category = id, error = %e, "rejected category json override");
                return false;
            }
        };
        let entry = &mut self.entries[row];
        entry.template = template;
        entry.apply_template_to_model();
        self.changes.data_changed(
            row,
            vec![
                CategoryRole::RawRendererTemplate.name(),
                CategoryRole::Renderer.name(),
                CategoryRole::Components.name(),
            ],
        );
        true
    }

    /// Prepends a shell-provided category. Special categories are never purged.
    pub fn add_special_category(
        &mut self,
        id: CategoryId,
        title: impl Into<String>,
        icon: impl Into<String>,
        raw_template: &str,
        count: usize,
    ) {
        if self.index_of(id.as_str()).is_some() {
            tracing::warn!(category = %id, "category already exists");
            return;
        }
        self.entries.insert(
            0,
            Entry {
                source: Source::Special {
                    id,
                    title: title.into(),
                    icon: icon.into(),
                    count,
                },
                template: self.defaults.resolve(raw_template),
                results: None,
                generation: self.generation,
            },
        );
        self.changes.inserted(0, 0);
    }

    pub fn set_special_count(&mut self, id: &str, new_count: usize) {
        let Some(row) = self.index_of(id) else {
            return;
        };
        if let Source::Special { count, .. } = &mut self.entries[row].source
            && *count != new_count
        {
            *count = new_count;
            self.changes.data_changed(row, vec![CategoryRole::Count.name()]);
        }
    }
}
