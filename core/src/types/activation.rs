use crate::types::{CannedQuery, ScopeResult};
use std::sync::Arc;

/// Backend reply to activating a result or triggering a preview action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationResponse {
    /// The shell should activate the result uri itself.
    NotHandled,
    ShowDash,
    HideDash,
    ShowPreview,
    PerformQuery(CannedQuery),
    /// The backend sent a replacement for the activated result.
    UpdateResult(Arc<ScopeResult>),
}
