//! Thread-safe accumulators for one batch of backend data.

use crate::dispatch::Delivery;
use crate::status::Status;
use dash_core::types::{
    ActivationResponse, ColumnLayout, Department, Filter, FilterState, PreviewWidget, ScopeResult,
};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Locks a mutex, recovering the data if a worker panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Data accumulated by a collector between two deliveries.
pub trait Payload: Default + Send + 'static {
    /// Moves the pending data out, leaving nothing to deliver twice.
    fn drain(&mut self) -> Self;

    /// Wraps a collector into the message posted to the consumer.
    fn into_delivery(collector: Arc<Collector<Self>>) -> Delivery;
}

#[derive(Debug, Default)]
struct State<P> {
    status: Status,
    posted: bool,
    payload: P,
}

/// Accumulates pushes from arbitrary worker threads and hands them to the
/// consumer in coalesced batches.
///
/// `posted` is set while a delivery is scheduled and not yet collected, so
/// at most one delivery per collector is pending at any time. A terminal
/// status is never replaced, except by [`Collector::invalidate`].
#[derive(Debug)]
pub struct Collector<P> {
    state: Mutex<State<P>>,
    started: Instant,
}

impl<P: Payload> Default for Collector<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> Collector<P> {
    pub fn new() -> Self {
        Self::with_payload(P::default())
    }

    pub fn with_payload(payload: P) -> Self {
        Self {
            state: Mutex::new(State {
                status: Status::Incomplete,
                posted: false,
                payload,
            }),
            started: Instant::now(),
        }
    }
}

/// Read operations.
impl<P: Payload> Collector<P> {
    pub fn status(&self) -> Status {
        lock(&self.state).status
    }

    pub fn is_posted(&self) -> bool {
        lock(&self.state).posted
    }

    /// Time since the operation started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Mutation operations.
impl<P: Payload> Collector<P> {
    /// Mutates the pending batch. Returns whether a delivery is already scheduled.
    pub fn add(&self, push: impl FnOnce(&mut P)) -> bool {
        let mut state = lock(&self.state);
        push(&mut state.payload);
        state.posted
    }

    /// Adopts `status` if still incomplete. Returns true when the caller must
    /// schedule a delivery, false when one is already pending.
    pub fn submit(&self, status: Status) -> bool {
        let mut state = lock(&self.state);
        if state.status == Status::Incomplete {
            state.status = status;
        }
        if state.posted {
            return false;
        }
        state.posted = true;
        true
    }

    /// Latches the status to cancelled.
    pub fn invalidate(&self) {
        lock(&self.state).status = Status::Cancelled;
    }

    /// Swaps out the pending batch along with the status at that moment.
    ///
    /// While still incomplete the collector is re-armed so the next push
    /// schedules a follow-up delivery.
    pub fn collect(&self) -> (Status, P) {
        let mut state = lock(&self.state);
        let status = state.status;
        if status == Status::Incomplete {
            state.posted = false;
        }
        (status, state.payload.drain())
    }
}

/// Filters and their state as delivered together with search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub filters: Vec<Filter>,
    pub state: FilterState,
}

/// Search results plus the latest department tree and filters.
///
/// Results are handed over once. The department and filters are shared and
/// stay in place, so every batch carries the latest ones.
#[derive(Debug, Default)]
pub struct SearchPayload {
    pub results: Vec<Arc<ScopeResult>>,
    pub department: Option<Arc<Department>>,
    pub filters: Option<Arc<FilterSet>>,
}

impl Payload for SearchPayload {
    fn drain(&mut self) -> Self {
        Self {
            results: std::mem::take(&mut self.results),
            department: self.department.clone(),
            filters: self.filters.clone(),
        }
    }

    fn into_delivery(collector: Arc<Collector<Self>>) -> Delivery {
        Delivery::Search(collector)
    }
}

#[derive(Debug, Default)]
pub struct PreviewPayload {
    pub column_layouts: Vec<ColumnLayout>,
    pub widgets: Vec<PreviewWidget>,
    pub data: Map<String, Value>,
}

impl Payload for PreviewPayload {
    fn drain(&mut self) -> Self {
        std::mem::take(self)
    }

    fn into_delivery(collector: Arc<Collector<Self>>) -> Delivery {
        Delivery::Preview(collector)
    }
}

/// The reply to activating `result`, or to one of its preview actions.
#[derive(Debug, Clone, Default)]
pub struct ActivationPayload {
    pub response: Option<ActivationResponse>,
    pub result: Option<Arc<ScopeResult>>,
    /// Category the result was shown in when activated.
    pub category_id: String,
}

impl ActivationPayload {
    pub fn new(result: Arc<ScopeResult>) -> Self {
        let category_id = result.category_id().to_string();
        Self {
            response: None,
            result: Some(result),
            category_id,
        }
    }
}

impl Payload for ActivationPayload {
    fn drain(&mut self) -> Self {
        self.clone()
    }

    fn into_delivery(collector: Arc<Collector<Self>>) -> Delivery {
        Delivery::Activation(collector)
    }
}
