use crate::types::CannedQuery;

/// A department subtree as delivered by the backend.
///
/// Partial deliveries resend only the browsed node and its immediate
/// children; `has_subdepartments` tells whether a child has more below it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Department {
    pub id: String,
    pub label: String,
    pub alternate_label: String,
    pub has_subdepartments: bool,
    pub query: CannedQuery,
    pub subdepartments: Vec<Department>,
}

impl Department {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_alternate_label(mut self, alternate_label: impl Into<String>) -> Self {
        self.alternate_label = alternate_label.into();
        self
    }

    pub fn with_query(mut self, query: CannedQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_has_subdepartments(mut self, has_subdepartments: bool) -> Self {
        self.has_subdepartments = has_subdepartments;
        self
    }

    pub fn with_subdepartments(mut self, subdepartments: Vec<Department>) -> Self {
        if !subdepartments.is_empty() {
            self.has_subdepartments = true;
        }
        self.subdepartments = subdepartments;
        self
    }
}
