pub mod categories;
pub mod department;
pub mod error;
pub mod filters;
pub mod model;
pub mod preview;
pub mod results;
pub mod template;
pub mod types;

pub use categories::{Categories, CategoryRole};
pub use error::{Error, Result};
pub use model::{ChangeLog, ModelChange};
pub use results::{ResultsModel, Role};
pub use template::TemplateDefaults;
