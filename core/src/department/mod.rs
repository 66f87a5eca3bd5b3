//! Department navigation tree, incremental merge, and navigation model.

mod merge;
mod model;
mod node;

pub use merge::{MergeOutcome, find_update_node};
pub use model::{DepartmentModel, SubdepartmentRow};
pub use node::{DepartmentNode, DepartmentTree, NodeId};
