//! Filters list, primary navigation filter, and the shared filter state.

mod widget;

pub use widget::{
    FilterGroupWidget, FilterWidget, OptionRow, OptionSelectorWidget, RangeInputWidget,
    ValueSliderWidget,
};

use crate::model::{ChangeLog, ModelChange};
use crate::types::{Filter, FilterState};
use widget::{FilterInput, group_filters, sync_filter_widgets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Primary,
    Row(usize),
    Nested(usize, usize),
}

/// Filters shown for a scope, updated in place across searches.
#[derive(Debug, Default)]
pub struct FiltersModel {
    filters: Vec<FilterWidget>,
    primary: Option<FilterWidget>,
    state: FilterState,
    changes: ChangeLog,
    primary_changed: bool,
    state_changed: bool,
}

impl FiltersModel {
    pub fn new(state: FilterState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    fn locate(&self, filter_id: &str) -> Option<Location> {
        if self.primary.as_ref().is_some_and(|p| p.id() == filter_id) {
            return Some(Location::Primary);
        }
        for (row, widget) in self.filters.iter().enumerate() {
            if widget.id() == filter_id {
                return Some(Location::Row(row));
            }
            if let FilterWidget::Group(group) = widget
                && let Some(inner) = group.filters().iter().position(|f| f.id() == filter_id)
            {
                return Some(Location::Nested(row, inner));
            }
        }
        None
    }

    fn widget_mut(&mut self, location: Location) -> Option<&mut FilterWidget> {
        match location {
            Location::Primary => self.primary.as_mut(),
            Location::Row(row) => self.filters.get_mut(row),
            Location::Nested(row, inner) => match self.filters.get_mut(row)? {
                FilterWidget::Group(group) => group.filters_mut().get_mut(inner),
                _ => None,
            },
        }
    }

    /// Re-reads a widget's values after the state changed under it.
    fn refresh(&mut self, location: Location) {
        let state = std::mem::take(&mut self.state);
        let roles = self
            .widget_mut(location)
            .map(|w| w.apply_state(&state))
            .unwrap_or_default();
        self.state = state;
        let row = match location {
            Location::Primary => return,
            Location::Row(row) | Location::Nested(row, _) => row,
        };
        if !roles.is_empty() {
            self.changes.data_changed(row, roles);
        }
    }
}

/// Read operations.
impl FiltersModel {
    pub fn count(&self) -> usize {
        self.filters.len()
    }

    pub fn filters(&self) -> &[FilterWidget] {
        &self.filters
    }

    pub fn filter(&self, filter_id: &str) -> Option<&FilterWidget> {
        match self.locate(filter_id)? {
            Location::Primary => self.primary.as_ref(),
            Location::Row(row) => self.filters.get(row),
            Location::Nested(row, inner) => match self.filters.get(row)? {
                FilterWidget::Group(group) => group.filters().get(inner),
                _ => None,
            },
        }
    }

    pub fn primary_filter(&self) -> Option<&FilterWidget> {
        self.primary.as_ref()
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.state
    }

    /// Selections differing from defaults, excluding the primary filter.
    pub fn active_filters_count(&self) -> usize {
        self.filters
            .iter()
            .map(|f| f.active_count(&self.state))
            .sum()
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }

    /// True once after the primary filter appeared, vanished, or was recreated.
    pub fn take_primary_filter_changed(&mut self) -> bool {
        std::mem::take(&mut self.primary_changed)
    }

    /// True once after a user edit changed the filter state.
    pub fn take_filter_state_changed(&mut self) -> bool {
        std::mem::take(&mut self.state_changed)
    }
}

/// Mutation operations.
impl FiltersModel {
    /// Syncs with the filters of a new search.
    ///
    /// The first single-select option selector asking to be primary is kept
    /// out of the list, unless departments already provide navigation.
    /// Filters sharing a group become one expandable widget when
    /// `process_groups` is set.
    pub fn update(&mut self, filters: &[Filter], contains_departments: bool, process_groups: bool) {
        let mut has_primary = contains_departments;
        let mut listed: Vec<&Filter> = Vec::with_capacity(filters.len());
        for filter in filters {
            if !filter.wants_primary() || has_primary {
                listed.push(filter);
                continue;
            }
            has_primary = true;
            let same_as_before = self
                .primary
                .as_ref()
                .is_some_and(|p| p.id() == filter.id && p.filter_type() == filter.filter_type());
            let input = FilterInput {
                id: filter.id.clone(),
                group_label: String::new(),
                filters: vec![filter],
            };
            match self.primary.as_mut() {
                Some(primary) if same_as_before => {
                    primary.update(&input, &self.state);
                }
                _ => {
                    self.primary = Some(FilterWidget::from_filter(filter, &self.state));
                    self.primary_changed = true;
                }
            }
        }

        if !has_primary && self.primary.take().is_some() {
            self.primary_changed = true;
        }

        let inputs = group_filters(&listed, process_groups);
        sync_filter_widgets(&inputs, &mut self.filters, &mut self.changes, &self.state);
    }

    /// Adopts a state delivered with search results.
    pub fn set_filter_state(&mut self, state: FilterState) {
        self.state = state;
        if let Some(primary) = self.primary.as_mut() {
            primary.apply_state(&self.state);
        }
        for (row, widget) in self.filters.iter_mut().enumerate() {
            let roles = widget.apply_state(&self.state);
            if !roles.is_empty() {
                self.changes.data_changed(row, roles);
            }
        }
    }

    /// Checks or unchecks an option. Single-select filters keep at most one option.
    pub fn set_option_checked(&mut self, filter_id: &str, option_id: &str, checked: bool) -> bool {
        let Some(location) = self.locate(filter_id) else {
            return false;
        };
        let Some(FilterWidget::OptionSelector(selector)) = self.widget_mut(location) else {
            return false;
        };
        if !selector.options().iter().any(|o| o.id == option_id) {
            return false;
        }
        let mut selected = selector.checked_ids();
        let was_checked = selected.iter().any(|id| id == option_id);
        if was_checked == checked {
            return false;
        }
        if checked {
            if !selector.multi_select {
                selected.clear();
            }
            selected.push(option_id.to_string());
        } else {
            selected.retain(|id| id != option_id);
        }
        self.state.set_active_options(filter_id, &selected);
        self.refresh(location);
        self.state_changed = true;
        true
    }

    pub fn set_range(&mut self, filter_id: &str, start: Option<f64>, end: Option<f64>) -> bool {
        let Some(location) = self.locate(filter_id) else {
            return false;
        };
        let Some(FilterWidget::RangeInput(range)) = self.widget_mut(location) else {
            return false;
        };
        if range.start == start && range.end == end {
            return false;
        }
        self.state.set_range(filter_id, start, end);
        self.refresh(location);
        self.state_changed = true;
        true
    }

    /// Sets a slider value, clamped to the slider's bounds.
    pub fn set_slider_value(&mut self, filter_id: &str, value: f64) -> bool {
        let Some(location) = self.locate(filter_id) else {
            return false;
        };
        let Some(FilterWidget::ValueSlider(slider)) = self.widget_mut(location) else {
            return false;
        };
        let value = value.max(slider.min).min(slider.max);
        if slider.value == value {
            return false;
        }
        self.state.set_slider_value(filter_id, value);
        self.refresh(location);
        self.state_changed = true;
        true
    }

    /// Restores every listed filter to its defaults.
    pub fn reset(&mut self) {
        tracing::debug!("resetting filters to defaults");
        let before = self.state.clone();
        for widget in &self.filters {
            widget.reset(&mut self.state);
        }
        for row in 0..self.filters.len() {
            self.refresh(Location::Row(row));
        }
        if self.state != before {
            self.state_changed = true;
        }
    }

    /// Drops every filter and the state.
    pub fn clear(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear();
        self.state.clear();
        self.changes.push(ModelChange::Reset);
    }
}
