use crate::department::{DepartmentTree, NodeId};
use crate::model::{ChangeLog, ModelChange, UpdateOutcome, sync_model};
use crate::types::CannedQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdepartmentRow {
    pub id: String,
    pub label: String,
    pub has_children: bool,
    pub is_active: bool,
}

/// Navigation view of one department node and its direct children.
pub struct DepartmentModel {
    scope_id: String,
    navigation_id: String,
    label: String,
    all_label: String,
    parent_navigation_id: String,
    parent_label: String,
    loaded: bool,
    is_root: bool,
    hidden: bool,
    subdepartments: Vec<SubdepartmentRow>,
    changes: ChangeLog,
}

impl DepartmentModel {
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            navigation_id: String::new(),
            label: String::new(),
            all_label: String::new(),
            parent_navigation_id: String::new(),
            parent_label: String::new(),
            loaded: false,
            is_root: false,
            hidden: false,
            subdepartments: Vec::new(),
            changes: ChangeLog::new(),
        }
    }

    fn query_for(&self, department_id: &str) -> String {
        if self.scope_id.is_empty() {
            tracing::warn!("unable to construct canned query, scope id is not set");
            return String::new();
        }
        CannedQuery::new(self.scope_id.as_str())
            .with_department(department_id)
            .to_uri()
    }
}

/// Read operations.
impl DepartmentModel {
    pub fn navigation_id(&self) -> &str {
        &self.navigation_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn all_label(&self) -> &str {
        &self.all_label
    }

    pub fn parent_navigation_id(&self) -> &str {
        &self.parent_navigation_id
    }

    pub fn parent_label(&self) -> &str {
        &self.parent_label
    }

    /// Children are known for a non-leaf node.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn count(&self) -> usize {
        self.subdepartments.len()
    }

    pub fn subdepartments(&self) -> &[SubdepartmentRow] {
        &self.subdepartments
    }

    pub fn query(&self) -> String {
        self.query_for(&self.navigation_id)
    }

    pub fn parent_query(&self) -> String {
        self.query_for(&self.parent_navigation_id)
    }

    pub fn subdepartment_query(&self, row: usize) -> Option<String> {
        self.subdepartments
            .get(row)
            .map(|sub| self.query_for(&sub.id))
    }

    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.take()
    }
}

/// Mutation operations.
impl DepartmentModel {
    /// Loads the node's attributes and syncs its children into the rows.
    ///
    /// Rows keep their active flag when the same subdepartment is still present.
    pub fn load_from_node(&mut self, tree: &DepartmentTree, node_id: NodeId) {
        let Some(node) = tree.node(node_id) else {
            tracing::warn!("tried to load department model from a missing node");
            return;
        };
        self.navigation_id = node.id.clone();
        self.label = node.label.clone();
        self.all_label = node.all_label.clone();
        self.loaded = !tree.is_leaf(node_id) && node.child_count() > 0;
        self.is_root = node.is_root;
        self.hidden = node.hidden;
        match node.parent().and_then(|p| tree.node(p)) {
            Some(parent) => {
                self.parent_navigation_id = parent.id.clone();
                self.parent_label = parent.label.clone();
            }
            None => {
                self.parent_navigation_id.clear();
                self.parent_label.clear();
            }
        }

        let before = self.subdepartments.len();
        let children: Vec<_> = node
            .children()
            .iter()
            .filter_map(|&c| tree.node(c))
            .collect();
        sync_model(
            &children,
            &mut self.subdepartments,
            &mut self.changes,
            |n| n.id.clone(),
            |row| row.id.clone(),
            |n| {
                Some(SubdepartmentRow {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    has_children: n.has_subdepartments,
                    is_active: false,
                })
            },
            |n, row| {
                let mut roles = Vec::new();
                if row.label != n.label {
                    row.label = n.label.clone();
                    roles.push("label");
                }
                if row.has_children != n.has_subdepartments {
                    row.has_children = n.has_subdepartments;
                    roles.push("hasChildren");
                }
                UpdateOutcome::Updated(roles)
            },
        );
        if self.subdepartments.len() != before {
            self.changes.push(ModelChange::CountChanged);
        }
    }

    /// Marks one subdepartment active; only one row may be active at a time.
    pub fn mark_subdepartment_active(&mut self, subdepartment_id: &str) {
        let mut index = None;
        let mut reset_other = false;
        for (i, sub) in self.subdepartments.iter_mut().enumerate() {
            if sub.id == subdepartment_id {
                sub.is_active = true;
                index = Some(i);
            } else if sub.is_active {
                sub.is_active = false;
                reset_other = true;
            }
        }
        let Some(index) = index else {
            return;
        };
        let (first, last) = if reset_other {
            (0, self.subdepartments.len() - 1)
        } else {
            (index, index)
        };
        self.changes.push(ModelChange::DataChanged {
            first,
            last,
            roles: vec!["isActive"],
        });
    }
}
