//! Category renderer template resolution.
//!
//! A category template is a JSON object merged over [`TemplateDefaults`]. The
//! merged `components` section tells the results model which result field
//! feeds which display role.

use crate::error::TemplateError;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

pub const DEFAULT_MAX_ATTRIBUTES: usize = 2;

/// Display role name to result field name.
pub type ComponentsMapping = HashMap<String, String>;

/// Schema defaults every category template is merged over.
///
/// Built once at startup and shared; parsing never touches a global.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefaults {
    root: Value,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateDefaults {
    pub fn new() -> Self {
        Self {
            root: json!({
                "schema-version": 1,
                "template": {
                    "category-layout": "grid",
                    "card-layout": "vertical",
                    "card-size": "small",
                    "overlay-mode": null,
                    "collapsed-rows": 2
                },
                "components": {
                    "title": null,
                    "art": { "aspect-ratio": 1.0, "fill-mode": "crop" },
                    "subtitle": null,
                    "mascot": null,
                    "emblem": null,
                    "summary": null,
                    "attributes": { "max-count": 2 },
                    "background": null,
                    "overlay-color": null
                },
                "resources": {}
            }),
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.root
    }

    /// Parses `raw` and merges it over the defaults.
    pub fn parse(&self, raw: &str) -> Result<CategoryTemplate, TemplateError> {
        let overrides: Value = serde_json::from_str(raw)?;
        if !overrides.is_object() {
            return Err(TemplateError::NotAnObject);
        }
        Ok(self.build(raw, &overrides))
    }

    /// Like [`parse`](Self::parse), but falls back to the bare defaults on malformed input.
    pub fn resolve(&self, raw: &str) -> CategoryTemplate {
        match self.parse(raw) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!(error = %e, "unable to parse category json, using defaults");
                self.build(raw, &Value::Object(Map::new()))
            }
        }
    }

    fn build(&self, raw: &str, overrides: &Value) -> CategoryTemplate {
        let mut root = merge_overrides(&self.root, overrides);

        if let Some(background) = root
            .get_mut("template")
            .and_then(|t| t.get_mut("card-background"))
            && let Some(uri) = background.as_str()
        {
            *background = expand_background_uri(uri);
        }

        let renderer = root.get("template").cloned().unwrap_or(Value::Null);
        let components = root.get("components").cloned().unwrap_or(Value::Null);
        CategoryTemplate {
            raw: raw.to_string(),
            renderer,
            components,
        }
    }
}

/// Resolved renderer and components sections plus the raw source.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTemplate {
    pub raw: String,
    pub renderer: Value,
    pub components: Value,
}

impl CategoryTemplate {
    /// Roles whose component object names a non-empty `field`.
    pub fn components_mapping(&self) -> ComponentsMapping {
        let Some(components) = self.components.as_object() else {
            return ComponentsMapping::new();
        };
        components
            .iter()
            .filter_map(|(role, component)| {
                let field = component.get("field")?.as_str()?;
                (!field.is_empty()).then(|| (role.clone(), field.to_string()))
            })
            .collect()
    }

    pub fn max_attributes(&self) -> usize {
        self.components
            .get("attributes")
            .and_then(|a| a.get("max-count"))
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_ATTRIBUTES, |n| n as usize)
    }
}

/// Recursively merges `overrides` over `defaults`.
///
/// Objects merge key by key with default keys first. A string over a null or
/// object default expands to that object plus `"field": <string>`, so
/// `"art": "icon"` becomes `{"aspect-ratio": 1.0, "fill-mode": "crop", "field": "icon"}`.
/// Anything else replaces the default.
pub fn merge_overrides(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(base), Value::Object(over)) => {
            let mut merged = Map::new();
            for (key, value) in base {
                let value = match over.get(key) {
                    Some(o) => merge_overrides(value, o),
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            for (key, value) in over {
                if !merged.contains_key(key) {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Value::Object(merged)
        }
        (Value::Null | Value::Object(_), Value::String(field)) => {
            let mut expanded = defaults.as_object().cloned().unwrap_or_default();
            expanded.insert("field".to_string(), Value::String(field.clone()));
            Value::Object(expanded)
        }
        _ => overrides.clone(),
    }
}

/// Expands `color:///<c>` and `gradient:///<a>/<b>` into `{type, elements}`.
/// Other strings are returned unchanged.
pub fn expand_background_uri(uri: &str) -> Value {
    if let Some(color) = uri.strip_prefix("color:///") {
        json!({ "type": "color", "elements": [color] })
    } else if let Some(stops) = uri.strip_prefix("gradient:///") {
        let elements: Vec<&str> = stops.split('/').filter(|s| !s.is_empty()).collect();
        json!({ "type": "gradient", "elements": elements })
    } else {
        Value::String(uri.to_string())
    }
}
