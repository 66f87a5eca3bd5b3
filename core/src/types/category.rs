use crate::types::CannedQuery;
use nutype::nutype;

pub const MAX_CATEGORY_ID_LENGTH: usize = 256;

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_CATEGORY_ID_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct CategoryId(String);

/// A named partition of results as announced by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub icon: String,
    /// Canned query behind the category header, if any.
    pub query: Option<CannedQuery>,
    /// Raw JSON renderer template.
    pub renderer_template: String,
}

impl Category {
    pub fn new(id: CategoryId, title: impl Into<String>, renderer_template: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            icon: String::new(),
            query: None,
            renderer_template: renderer_template.into(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_query(mut self, query: CannedQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// Header link URI, empty when the category carries no query.
    pub fn header_link(&self) -> String {
        self.query.as_ref().map(CannedQuery::to_uri).unwrap_or_default()
    }
}
