//! Hands collectors over from worker threads to the consumer thread.

use crate::collector::{
    ActivationPayload, Collector, Payload, PreviewPayload, SearchPayload, lock,
};
use crate::status::Status;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// A "collect now" message. It owns the collector, so the status can still
/// be checked after the operation was superseded.
#[derive(Debug, Clone)]
pub enum Delivery {
    Search(Arc<Collector<SearchPayload>>),
    Preview(Arc<Collector<PreviewPayload>>),
    Activation(Arc<Collector<ActivationPayload>>),
}

impl Delivery {
    pub fn status(&self) -> Status {
        match self {
            Delivery::Search(c) => c.status(),
            Delivery::Preview(c) => c.status(),
            Delivery::Activation(c) => c.status(),
        }
    }
}

/// Producer side of the delivery queue.
///
/// `notify` wakes the consumer, e.g. by posting a repaint to the UI loop.
#[derive(Clone)]
pub struct DeliverySender {
    tx: Sender<Delivery>,
    notify: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl DeliverySender {
    /// Queues a delivery. Returns false when the consumer is gone.
    pub fn send(&self, delivery: Delivery) -> bool {
        self.tx.send(delivery).is_ok()
    }

    pub fn wake(&self) {
        if let Some(notify) = &self.notify {
            notify();
        }
    }
}

/// Consumer side of the delivery queue, drained on the UI thread.
pub struct DeliveryQueue {
    rx: Receiver<Delivery>,
}

impl DeliveryQueue {
    pub fn try_next(&self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }

    /// Everything queued so far, in posting order.
    pub fn drain(&self) -> Vec<Delivery> {
        self.rx.try_iter().collect()
    }
}

pub fn delivery_channel(
    notify: Option<Arc<dyn Fn() + Send + Sync>>,
) -> (DeliverySender, DeliveryQueue) {
    let (tx, rx) = mpsc::channel();
    (DeliverySender { tx, notify }, DeliveryQueue { rx })
}

/// Posts a collector to the consumer at most once per outstanding batch.
///
/// The receiver is cleared under its own lock on invalidation, so a worker
/// racing with it either posts before the clear or sees no receiver.
pub struct DispatchBridge<P> {
    collector: Arc<Collector<P>>,
    receiver: Mutex<Option<DeliverySender>>,
}

impl<P: Payload> DispatchBridge<P> {
    pub fn new(collector: Arc<Collector<P>>, receiver: DeliverySender) -> Self {
        Self {
            collector,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    pub fn collector(&self) -> &Arc<Collector<P>> {
        &self.collector
    }

    pub fn is_valid(&self) -> bool {
        lock(&self.receiver).is_some()
    }

    /// Submits `status` and posts a delivery if none is pending.
    pub fn notify(&self, status: Status) {
        if !self.collector.submit(status) {
            return;
        }
        let sender = {
            let receiver = lock(&self.receiver);
            let Some(sender) = receiver.as_ref() else {
                tracing::debug!(?status, "receiver gone, dropping delivery");
                return;
            };
            if !sender.send(P::into_delivery(Arc::clone(&self.collector))) {
                tracing::debug!(?status, "delivery queue closed");
                return;
            }
            sender.clone()
        };
        sender.wake();
    }

    /// Detaches the receiver and cancels the collector.
    pub fn invalidate(&self) {
        lock(&self.receiver).take();
        self.collector.invalidate();
    }
}
