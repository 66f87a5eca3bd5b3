use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filters sharing a group are presented as one expandable widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    pub default_checked: bool,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            default_checked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueLabel {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    OptionSelector {
        label: String,
        multi_select: bool,
        options: Vec<FilterOption>,
    },
    RangeInput {
        start_label: String,
        end_label: String,
        unit_label: String,
        default_start: Option<f64>,
        default_end: Option<f64>,
    },
    ValueSlider {
        min: f64,
        max: f64,
        default_value: f64,
        labels: Vec<ValueLabel>,
    },
}

/// Filter widget type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    OptionSelector,
    RangeInput,
    ValueSlider,
    ExpandableGroup,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::OptionSelector => "option_selector",
            FilterType::RangeInput => "range_input",
            FilterType::ValueSlider => "value_slider",
            FilterType::ExpandableGroup => "expandable_group",
        }
    }
}

/// A filter definition as delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub id: String,
    pub title: String,
    /// Asks to be rendered as the primary navigation selector.
    pub primary: bool,
    pub group: Option<FilterGroup>,
    pub kind: FilterKind,
}

impl Filter {
    pub fn option_selector(
        id: impl Into<String>,
        label: impl Into<String>,
        multi_select: bool,
        options: Vec<FilterOption>,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            primary: false,
            group: None,
            kind: FilterKind::OptionSelector {
                label: label.into(),
                multi_select,
                options,
            },
        }
    }

    pub fn range_input(id: impl Into<String>, default_start: Option<f64>, default_end: Option<f64>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            primary: false,
            group: None,
            kind: FilterKind::RangeInput {
                start_label: String::new(),
                end_label: String::new(),
                unit_label: String::new(),
                default_start,
                default_end,
            },
        }
    }

    pub fn value_slider(id: impl Into<String>, min: f64, max: f64, default_value: f64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            primary: false,
            group: None,
            kind: FilterKind::ValueSlider {
                min,
                max,
                default_value,
                labels: Vec::new(),
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_group(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.group = Some(FilterGroup {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    pub fn filter_type(&self) -> FilterType {
        match self.kind {
            FilterKind::OptionSelector { .. } => FilterType::OptionSelector,
            FilterKind::RangeInput { .. } => FilterType::RangeInput,
            FilterKind::ValueSlider { .. } => FilterType::ValueSlider,
        }
    }

    /// Only single-select option selectors may serve as primary navigation.
    pub fn wants_primary(&self) -> bool {
        self.primary
            && matches!(
                self.kind,
                FilterKind::OptionSelector {
                    multi_select: false,
                    ..
                }
            )
    }
}

/// Per-filter user selections, keyed by filter id.
///
/// Option selectors store an array of checked option ids, range inputs a
/// two-element `[start, end]` array with nulls for unset bounds, and value
/// sliders a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(Map<String, Value>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<Map<String, Value>>(json).ok().map(Self)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_filter(&self, filter_id: &str) -> bool {
        self.0.contains_key(filter_id)
    }

    pub fn get(&self, filter_id: &str) -> Option<&Value> {
        self.0.get(filter_id)
    }

    pub fn set(&mut self, filter_id: impl Into<String>, value: Value) {
        self.0.insert(filter_id.into(), value);
    }

    pub fn remove(&mut self, filter_id: &str) -> Option<Value> {
        self.0.remove(filter_id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn active_options(&self, filter_id: &str) -> Vec<String> {
        match self.0.get(filter_id) {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_active_options(&mut self, filter_id: impl Into<String>, option_ids: &[String]) {
        let ids = option_ids.iter().cloned().map(Value::String).collect();
        self.0.insert(filter_id.into(), Value::Array(ids));
    }

    pub fn range(&self, filter_id: &str) -> (Option<f64>, Option<f64>) {
        match self.0.get(filter_id) {
            Some(Value::Array(bounds)) if bounds.len() == 2 => {
                (bounds[0].as_f64(), bounds[1].as_f64())
            }
            _ => (None, None),
        }
    }

    pub fn set_range(&mut self, filter_id: impl Into<String>, start: Option<f64>, end: Option<f64>) {
        let bound = |b: Option<f64>| b.map(Value::from).unwrap_or(Value::Null);
        self.0
            .insert(filter_id.into(), Value::Array(vec![bound(start), bound(end)]));
    }

    pub fn slider_value(&self, filter_id: &str) -> Option<f64> {
        self.0.get(filter_id).and_then(Value::as_f64)
    }

    pub fn set_slider_value(&mut self, filter_id: impl Into<String>, value: f64) {
        self.0.insert(filter_id.into(), Value::from(value));
    }
}
