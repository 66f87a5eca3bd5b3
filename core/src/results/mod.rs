//! Per-category result lists and the ordered diff that keeps them current.

mod diff;
mod map;
mod model;

pub use diff::{DiffStats, reconcile};
pub use map::ResultsMap;
pub use model::{ResultsModel, Role};

#[cfg(test)]
mod tests;
