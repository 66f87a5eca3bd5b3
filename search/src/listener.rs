//! Backend callback contracts and the adapters feeding collectors.
//!
//! Every push lands in the collector and triggers a delivery only when none
//! is pending. `finished` always notifies, so the terminal status is
//! eventually observed even when a delivery is already queued.

use crate::collector::{
    ActivationPayload, Collector, FilterSet, PreviewPayload, SearchPayload,
};
use crate::dispatch::{DeliverySender, DispatchBridge};
use crate::status::{CompletionDetails, CompletionStatus, Status};
use dash_core::types::{
    ActivationResponse, ColumnLayout, Department, Filter, FilterState, PreviewWidget, ScopeResult,
};
use serde_json::Value;
use std::sync::Arc;

pub trait SearchListener: Send + Sync {
    fn push_result(&self, result: Arc<ScopeResult>);
    /// The department tree for the current search, possibly partial.
    fn push_department(&self, department: Department);
    fn push_filters(&self, filters: Vec<Filter>, state: FilterState);
    fn finished(&self, details: CompletionDetails);
}

pub trait PreviewListener: Send + Sync {
    fn push_column_layouts(&self, layouts: Vec<ColumnLayout>);
    fn push_widgets(&self, widgets: Vec<PreviewWidget>);
    fn push_data(&self, key: String, value: Value);
    fn finished(&self, details: CompletionDetails);
}

pub trait ActivationListener: Send + Sync {
    fn activated(&self, response: ActivationResponse);
    fn finished(&self, details: CompletionDetails);
}

/// The consumer-facing side of a listener.
pub trait DataReceiver: Send + Sync {
    /// Stops further deliveries and cancels whatever is pending.
    fn invalidate(&self);
}

/// Preview and activation only distinguish cancellation from completion.
fn plain_terminal_status(details: &CompletionDetails) -> Status {
    match details.status {
        CompletionStatus::Cancelled => Status::Cancelled,
        CompletionStatus::Ok | CompletionStatus::Error => Status::Finished,
    }
}

pub struct SearchResultReceiver {
    bridge: DispatchBridge<SearchPayload>,
}

impl SearchResultReceiver {
    pub fn new(receiver: DeliverySender) -> Arc<Self> {
        Arc::new(Self {
            bridge: DispatchBridge::new(Arc::new(Collector::new()), receiver),
        })
    }

    pub fn collector(&self) -> &Arc<Collector<SearchPayload>> {
        self.bridge.collector()
    }

    fn push(&self, push: impl FnOnce(&mut SearchPayload)) {
        if !self.bridge.collector().add(push) {
            self.bridge.notify(Status::Incomplete);
        }
    }
}

impl SearchListener for SearchResultReceiver {
    fn push_result(&self, result: Arc<ScopeResult>) {
        self.push(|payload| payload.results.push(result));
    }

    fn push_department(&self, department: Department) {
        self.push(|payload| payload.department = Some(Arc::new(department)));
    }

    fn push_filters(&self, filters: Vec<Filter>, state: FilterState) {
        self.push(|payload| payload.filters = Some(Arc::new(FilterSet { filters, state })));
    }

    fn finished(&self, details: CompletionDetails) {
        self.bridge.notify(details.to_status());
    }
}

impl DataReceiver for SearchResultReceiver {
    fn invalidate(&self) {
        self.bridge.invalidate();
    }
}

pub struct PreviewDataReceiver {
    bridge: DispatchBridge<PreviewPayload>,
}

impl PreviewDataReceiver {
    pub fn new(receiver: DeliverySender) -> Arc<Self> {
        Arc::new(Self {
            bridge: DispatchBridge::new(Arc::new(Collector::new()), receiver),
        })
    }

    pub fn collector(&self) -> &Arc<Collector<PreviewPayload>> {
        self.bridge.collector()
    }

    fn push(&self, push: impl FnOnce(&mut PreviewPayload)) {
        if !self.bridge.collector().add(push) {
            self.bridge.notify(Status::Incomplete);
        }
    }
}

impl PreviewListener for PreviewDataReceiver {
    fn push_column_layouts(&self, layouts: Vec<ColumnLayout>) {
        self.push(|payload| payload.column_layouts.extend(layouts));
    }

    fn push_widgets(&self, widgets: Vec<PreviewWidget>) {
        self.push(|payload| payload.widgets.extend(widgets));
    }

    fn push_data(&self, key: String, value: Value) {
        self.push(|payload| {
            payload.data.insert(key, value);
        });
    }

    fn finished(&self, details: CompletionDetails) {
        self.bridge.notify(plain_terminal_status(&details));
    }
}

impl DataReceiver for PreviewDataReceiver {
    fn invalidate(&self) {
        self.bridge.invalidate();
    }
}

pub struct ActivationReceiver {
    bridge: DispatchBridge<ActivationPayload>,
}

impl ActivationReceiver {
    /// Creates a receiver for the activation of `result`.
    pub fn new(receiver: DeliverySender, result: Arc<ScopeResult>) -> Arc<Self> {
        let collector = Collector::with_payload(ActivationPayload::new(result));
        Arc::new(Self {
            bridge: DispatchBridge::new(Arc::new(collector), receiver),
        })
    }

    pub fn collector(&self) -> &Arc<Collector<ActivationPayload>> {
        self.bridge.collector()
    }
}

impl ActivationListener for ActivationReceiver {
    fn activated(&self, response: ActivationResponse) {
        if !self
            .bridge
            .collector()
            .add(|payload| payload.response = Some(response))
        {
            self.bridge.notify(Status::Incomplete);
        }
    }

    fn finished(&self, details: CompletionDetails) {
        self.bridge.notify(plain_terminal_status(&details));
    }
}

impl DataReceiver for ActivationReceiver {
    fn invalidate(&self) {
        self.bridge.invalidate();
    }
}
