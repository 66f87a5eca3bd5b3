use crate::listener::DataReceiver;
use crate::proxy::QueryCtrl;
use std::sync::Arc;

/// Owns the receiver and query handle of one in-flight operation.
///
/// Dropping the controller detaches the receiver but leaves the backend
/// call running; [`CollectionController::invalidate`] also cancels it.
#[derive(Default)]
pub struct CollectionController {
    receiver: Option<Arc<dyn DataReceiver>>,
    ctrl: Option<Box<dyn QueryCtrl>>,
}

impl CollectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.receiver.is_some()
    }

    /// Replaces the receiver, invalidating the previous one.
    pub fn set_receiver(&mut self, receiver: Arc<dyn DataReceiver>) {
        if let Some(previous) = self.receiver.replace(receiver) {
            previous.invalidate();
        }
    }

    pub fn set_controller(&mut self, ctrl: Box<dyn QueryCtrl>) {
        self.ctrl = Some(ctrl);
    }

    pub fn invalidate(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.invalidate();
        }
        if let Some(ctrl) = self.ctrl.take() {
            ctrl.cancel();
        }
    }
}

impl Drop for CollectionController {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.invalidate();
        }
    }
}
