use crate::model::{ChangeLog, ModelChange, UpdateOutcome, sync_model};
use crate::types::{Filter, FilterKind, FilterOption, FilterState, FilterType, ValueLabel};
use std::collections::HashSet;

/// One row of the filters list before widgets are built: a lone filter, or
/// every filter sharing a group id.
#[derive(Debug, Clone)]
pub(crate) struct FilterInput<'a> {
    pub(crate) id: String,
    pub(crate) group_label: String,
    pub(crate) filters: Vec<&'a Filter>,
}

impl FilterInput<'_> {
    pub(crate) fn is_group(&self) -> bool {
        self.filters.len() > 1
    }

    pub(crate) fn filter_type(&self) -> FilterType {
        match self.filters.first() {
            Some(f) if !self.is_group() => f.filter_type(),
            _ => FilterType::ExpandableGroup,
        }
    }
}

/// Groups filters by group id in first-seen order.
pub(crate) fn group_filters<'a>(filters: &[&'a Filter], process_groups: bool) -> Vec<FilterInput<'a>> {
    let mut inputs: Vec<FilterInput<'a>> = Vec::new();
    for &filter in filters {
        let group = filter.group.as_ref().filter(|_| process_groups);
        let existing = group.and_then(|g| {
            inputs
                .iter_mut()
                .find(|i| i.filters.first().and_then(|f| f.group.as_ref()).is_some_and(|fg| fg.id == g.id))
        });
        match existing {
            Some(input) => {
                input.filters.push(filter);
                if let Some(g) = group {
                    input.id = g.id.clone();
                }
            }
            None => inputs.push(FilterInput {
                id: filter.id.clone(),
                group_label: group.map(|g| g.label.clone()).unwrap_or_default(),
                filters: vec![filter],
            }),
        }
    }
    inputs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug)]
pub struct OptionSelectorWidget {
    pub id: String,
    pub title: String,
    pub label: String,
    pub multi_select: bool,
    options: Vec<OptionRow>,
    defaults: Vec<FilterOption>,
    changes: ChangeLog,
}

impl OptionSelectorWidget {
    pub fn options(&self) -> &[OptionRow] {
        &self.options
    }

    pub fn checked_ids(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }

    /// Checked option ids: the stored selection, or the defaults when the
    /// state has no entry for this filter.
    fn checked_set(&self, state: &FilterState) -> HashSet<String> {
        if state.has_filter(&self.id) {
            state.active_options(&self.id).into_iter().collect()
        } else {
            self.defaults
                .iter()
                .filter(|o| o.default_checked)
                .map(|o| o.id.clone())
                .collect()
        }
    }

    fn sync_options(&mut self, state: &FilterState) {
        let checked = self.checked_set(state);
        let defaults = std::mem::take(&mut self.defaults);
        sync_model(
            &defaults,
            &mut self.options,
            &mut self.changes,
            |o| o.id.clone(),
            |row| row.id.clone(),
            |o| {
                Some(OptionRow {
                    id: o.id.clone(),
                    label: o.label.clone(),
                    checked: checked.contains(&o.id),
                })
            },
            |o, row| {
                let mut roles = Vec::new();
                if row.label != o.label {
                    row.label = o.label.clone();
                    roles.push("label");
                }
                let is_checked = checked.contains(&o.id);
                if row.checked != is_checked {
                    row.checked = is_checked;
                    roles.push("checked");
                }
                UpdateOutcome::Updated(roles)
            },
        );
        self.defaults = defaults;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeInputWidget {
    pub id: String,
    pub title: String,
    pub start_label: String,
    pub end_label: String,
    pub unit_label: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSliderWidget {
    pub id: String,
    pub title: String,
    pub min: f64,
    pub max: f64,
    pub default_value: f64,
    pub value: f64,
    pub labels: Vec<ValueLabel>,
}

impl ValueSliderWidget {
    fn value_from(&self, state: &FilterState) -> f64 {
        state.slider_value(&self.id).unwrap_or(self.default_value)
    }
}

#[derive(Debug)]
pub struct FilterGroupWidget {
    pub id: String,
    pub label: String,
    filters: Vec<FilterWidget>,
    changes: ChangeLog,
}

impl FilterGroupWidget {
    pub fn filters(&self) -> &[FilterWidget] {
        &self.filters
    }

    pub(crate) fn filters_mut(&mut self) -> &mut [FilterWidget] {
        &mut self.filters
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }

    fn sync(&mut self, filters: &[&Filter], state: &FilterState) {
        let inputs = group_filters(filters, false);
        sync_filter_widgets(&inputs, &mut self.filters, &mut self.changes, state);
    }
}

/// Presentation object for one row of a filters list.
#[derive(Debug)]
pub enum FilterWidget {
    OptionSelector(OptionSelectorWidget),
    RangeInput(RangeInputWidget),
    ValueSlider(ValueSliderWidget),
    Group(FilterGroupWidget),
}

impl FilterWidget {
    pub(crate) fn create(input: &FilterInput<'_>, state: &FilterState) -> Option<Self> {
        if input.is_group() {
            let mut group = FilterGroupWidget {
                id: input.id.clone(),
                label: input.group_label.clone(),
                filters: Vec::new(),
                changes: ChangeLog::new(),
            };
            group.sync(&input.filters, state);
            return Some(FilterWidget::Group(group));
        }
        input.filters.first().map(|f| Self::from_filter(f, state))
    }

    pub(crate) fn from_filter(filter: &Filter, state: &FilterState) -> Self {
        match &filter.kind {
            FilterKind::OptionSelector {
                label,
                multi_select,
                options,
            } => {
                let mut widget = OptionSelectorWidget {
                    id: filter.id.clone(),
                    title: filter.title.clone(),
                    label: label.clone(),
                    multi_select: *multi_select,
                    options: Vec::new(),
                    defaults: options.clone(),
                    changes: ChangeLog::new(),
                };
                widget.sync_options(state);
                widget.take_changes();
                FilterWidget::OptionSelector(widget)
            }
            FilterKind::RangeInput {
                start_label,
                end_label,
                unit_label,
                ..
            } => {
                let (start, end) = state.range(&filter.id);
                FilterWidget::RangeInput(RangeInputWidget {
                    id: filter.id.clone(),
                    title: filter.title.clone(),
                    start_label: start_label.clone(),
                    end_label: end_label.clone(),
                    unit_label: unit_label.clone(),
                    start,
                    end,
                })
            }
            FilterKind::ValueSlider {
                min,
                max,
                default_value,
                labels,
            } => {
                let mut widget = ValueSliderWidget {
                    id: filter.id.clone(),
                    title: filter.title.clone(),
                    min: *min,
                    max: *max,
                    default_value: *default_value,
                    value: *default_value,
                    labels: labels.clone(),
                };
                widget.value = widget.value_from(state);
                FilterWidget::ValueSlider(widget)
            }
        }
    }

    pub fn id(&self) -> &str {
        match self {
            FilterWidget::OptionSelector(w) => &w.id,
            FilterWidget::RangeInput(w) => &w.id,
            FilterWidget::ValueSlider(w) => &w.id,
            FilterWidget::Group(w) => &w.id,
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            FilterWidget::OptionSelector(_) => FilterType::OptionSelector,
            FilterWidget::RangeInput(_) => FilterType::RangeInput,
            FilterWidget::ValueSlider(_) => FilterType::ValueSlider,
            FilterWidget::Group(_) => FilterType::ExpandableGroup,
        }
    }

    /// Updates in place from a redelivered definition. A changed type cannot
    /// be updated and asks for replacement.
    pub(crate) fn update(&mut self, input: &FilterInput<'_>, state: &FilterState) -> UpdateOutcome {
        if input.filter_type() != self.filter_type() {
            return UpdateOutcome::Replace;
        }
        if let FilterWidget::Group(group) = self {
            let mut roles = Vec::new();
            if group.label != input.group_label {
                group.label = input.group_label.clone();
                roles.push("title");
            }
            group.sync(&input.filters, state);
            return UpdateOutcome::Updated(roles);
        }
        let Some(filter) = input.filters.first() else {
            return UpdateOutcome::Replace;
        };

        let mut roles = Vec::new();
        match (&mut *self, &filter.kind) {
            (
                FilterWidget::OptionSelector(w),
                FilterKind::OptionSelector {
                    label,
                    multi_select,
                    options,
                },
            ) => {
                if w.label != *label {
                    w.label = label.clone();
                    roles.push("label");
                }
                if w.multi_select != *multi_select {
                    w.multi_select = *multi_select;
                    roles.push("multiSelect");
                }
                w.defaults = options.clone();
            }
            (
                FilterWidget::RangeInput(w),
                FilterKind::RangeInput {
                    start_label,
                    end_label,
                    unit_label,
                    ..
                },
            ) => {
                if w.start_label != *start_label || w.end_label != *end_label || w.unit_label != *unit_label {
                    w.start_label = start_label.clone();
                    w.end_label = end_label.clone();
                    w.unit_label = unit_label.clone();
                    roles.push("labels");
                }
            }
            (
                FilterWidget::ValueSlider(w),
                FilterKind::ValueSlider {
                    min,
                    max,
                    default_value,
                    labels,
                },
            ) => {
                if w.min != *min {
                    w.min = *min;
                    roles.push("minValue");
                }
                if w.max != *max {
                    w.max = *max;
                    roles.push("maxValue");
                }
                if w.labels != *labels {
                    w.labels = labels.clone();
                    roles.push("values");
                }
                w.default_value = *default_value;
            }
            _ => return UpdateOutcome::Replace,
        }
        if filter.title != self.title() {
            self.set_title(filter.title.clone());
            roles.push("title");
        }
        roles.extend(self.apply_state(state));
        UpdateOutcome::Updated(roles)
    }

    fn title(&self) -> &str {
        match self {
            FilterWidget::OptionSelector(w) => &w.title,
            FilterWidget::RangeInput(w) => &w.title,
            FilterWidget::ValueSlider(w) => &w.title,
            FilterWidget::Group(w) => &w.label,
        }
    }

    fn set_title(&mut self, title: String) {
        match self {
            FilterWidget::OptionSelector(w) => w.title = title,
            FilterWidget::RangeInput(w) => w.title = title,
            FilterWidget::ValueSlider(w) => w.title = title,
            FilterWidget::Group(w) => w.label = title,
        }
    }

    /// Re-reads the widget's values from `state`, returning changed roles.
    pub(crate) fn apply_state(&mut self, state: &FilterState) -> Vec<&'static str> {
        let mut roles = Vec::new();
        match self {
            FilterWidget::OptionSelector(w) => w.sync_options(state),
            FilterWidget::RangeInput(w) => {
                let (start, end) = state.range(&w.id);
                if w.start != start {
                    w.start = start;
                    roles.push("startValue");
                }
                if w.end != end {
                    w.end = end;
                    roles.push("endValue");
                }
            }
            FilterWidget::ValueSlider(w) => {
                let value = w.value_from(state);
                if w.value != value {
                    w.value = value;
                    roles.push("value");
                }
            }
            FilterWidget::Group(g) => {
                for filter in &mut g.filters {
                    filter.apply_state(state);
                }
            }
        }
        roles
    }

    /// Drops this filter's entries from `state` so defaults apply again.
    pub(crate) fn reset(&self, state: &mut FilterState) {
        match self {
            FilterWidget::Group(g) => g.filters.iter().for_each(|f| f.reset(state)),
            other => {
                state.remove(other.id());
            }
        }
    }

    /// Number of user selections that differ from the defaults.
    pub fn active_count(&self, state: &FilterState) -> usize {
        match self {
            FilterWidget::OptionSelector(w) => {
                if state.has_filter(&w.id) {
                    state.active_options(&w.id).len()
                } else {
                    0
                }
            }
            FilterWidget::RangeInput(w) => usize::from(w.start.is_some() || w.end.is_some()),
            FilterWidget::ValueSlider(w) => {
                usize::from(state.slider_value(&w.id).is_some_and(|v| v != w.default_value))
            }
            FilterWidget::Group(g) => g.filters.iter().map(|f| f.active_count(state)).sum(),
        }
    }
}

/// Syncs a widget list against grouped filter inputs.
pub(crate) fn sync_filter_widgets(
    inputs: &[FilterInput<'_>],
    widgets: &mut Vec<FilterWidget>,
    changes: &mut ChangeLog,
    state: &FilterState,
) {
    sync_model(
        inputs,
        widgets,
        changes,
        |input| input.id.clone(),
        |widget| widget.id().to_string(),
        |input| FilterWidget::create(input, state),
        |input, widget| widget.update(input, state),
    );
}
