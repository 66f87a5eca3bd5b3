//! The backend collaborator that issues searches, previews, and activations.

use crate::error::ProxyError;
use crate::listener::{ActivationListener, PreviewListener, SearchListener};
use dash_core::types::config::FormFactor;
use dash_core::types::{FilterState, ScopeResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Hint telling the backend not to reach out to remote content.
pub const NO_INTERNET_HINT: &str = "no-internet";

/// Handle to an in-flight backend call.
pub trait QueryCtrl: Send {
    fn cancel(&self);
}

/// Per-call metadata sent along with every request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMetadata {
    pub form_factor: FormFactor,
    pub hints: Map<String, Value>,
}

impl SearchMetadata {
    pub fn new(form_factor: FormFactor) -> Self {
        Self {
            form_factor,
            hints: Map::new(),
        }
    }

    pub fn with_hint(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.hints.insert(name.into(), value.into());
        self
    }

    pub fn hint(&self, name: &str) -> Option<&Value> {
        self.hints.get(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query_string: String,
    pub department_id: String,
    pub filter_state: FilterState,
    pub metadata: SearchMetadata,
}

/// Issues backend calls. Listeners are invoked from arbitrary threads.
pub trait ScopeProxy: Send + Sync {
    fn search(
        &self,
        request: &SearchRequest,
        listener: Arc<dyn SearchListener>,
    ) -> Result<Box<dyn QueryCtrl>, ProxyError>;

    fn preview(
        &self,
        result: &Arc<ScopeResult>,
        metadata: &SearchMetadata,
        listener: Arc<dyn PreviewListener>,
    ) -> Result<Box<dyn QueryCtrl>, ProxyError>;

    fn activate(
        &self,
        result: &Arc<ScopeResult>,
        metadata: &SearchMetadata,
        listener: Arc<dyn ActivationListener>,
    ) -> Result<Box<dyn QueryCtrl>, ProxyError>;

    /// Triggers `action_id` of preview widget `widget_id`.
    fn perform_action(
        &self,
        result: &Arc<ScopeResult>,
        metadata: &SearchMetadata,
        widget_id: &str,
        action_id: &str,
        listener: Arc<dyn ActivationListener>,
    ) -> Result<Box<dyn QueryCtrl>, ProxyError>;
}
