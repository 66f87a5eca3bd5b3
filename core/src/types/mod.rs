pub(crate) mod activation;
pub use activation::ActivationResponse;

pub(crate) mod canned_query;
pub use canned_query::CannedQuery;

pub(crate) mod category;
pub use category::{Category, CategoryId, CategoryIdError, MAX_CATEGORY_ID_LENGTH};

pub mod config;
pub use config::ShellConfig;

pub(crate) mod department;
pub use department::Department;

pub(crate) mod filter;
pub use filter::{Filter, FilterGroup, FilterKind, FilterOption, FilterState, FilterType, ValueLabel};

pub(crate) mod preview;
pub use preview::{ColumnLayout, PreviewWidget};

pub(crate) mod result;
pub use result::{Keyed, ScopeResult};
