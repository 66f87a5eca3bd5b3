//! Change notification and generic keyed list synchronisation.

mod change;
mod order;
mod sync;

pub use change::{ChangeLog, ModelChange};
pub(crate) use order::reorder;
pub use sync::{UpdateOutcome, sync_model};

#[cfg(test)]
mod tests;
