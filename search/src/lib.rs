//! Dash scope search pipeline.
//!
//! Carries backend callbacks from arbitrary worker threads to the single UI
//! thread that owns the `dash_core` presentation models.
//!
//! # Design
//!
//! - Each backend call gets a listener adapter backed by a [`Collector`].
//!   Workers push into the collector under its mutex.
//! - A [`DispatchBridge`] posts the collector onto the delivery queue at most
//!   once per outstanding batch. Later pushes are picked up by that delivery.
//! - Superseding a call invalidates its bridge: the receiver is detached and
//!   the collector latches to cancelled, so a delivery still in the queue is
//!   recognised and discarded.
//! - [`Scope`] drains the queue on the UI thread and applies results,
//!   departments, filters, previews and activations to the models.
//!
//! # Non-blocking API
//!
//! - `dispatch_search()`: Issues a search through the [`ScopeProxy`]
//! - `process_deliveries()`: Applies everything delivered so far
//! - `take_events()`: Actions the UI must perform (open a uri, show a preview)

mod collector;
mod controller;
mod dispatch;
mod error;
mod listener;
mod proxy;
mod scope;
mod status;

pub use collector::{
    ActivationPayload, Collector, FilterSet, Payload, PreviewPayload, SearchPayload,
};
pub use controller::CollectionController;
pub use dispatch::{Delivery, DeliveryQueue, DeliverySender, DispatchBridge, delivery_channel};
pub use error::{ProxyError, Result, ScopeError};
pub use listener::{
    ActivationListener, ActivationReceiver, DataReceiver, PreviewDataReceiver, PreviewListener,
    SearchListener, SearchResultReceiver,
};
pub use proxy::{NO_INTERNET_HINT, QueryCtrl, ScopeProxy, SearchMetadata, SearchRequest};
pub use scope::{ResultsTtl, Scope, ScopeEvent, ScopeMetadata};
pub use status::{CompletionDetails, CompletionStatus, OperationInfo, Status};
