use crate::types::{Department, Filter, FilterKind, FilterOption};

/// Handle to a node inside a [`DepartmentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartmentNode {
    pub id: String,
    pub label: String,
    pub all_label: String,
    /// Owning filter id for nodes built from a primary navigation filter.
    pub filter_id: String,
    pub has_subdepartments: bool,
    pub is_root: bool,
    pub hidden: bool,
    pub is_filter: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DepartmentNode {
    fn for_department(dep: &Department, parent: Option<NodeId>) -> Self {
        Self {
            id: dep.id.clone(),
            label: dep.label.clone(),
            all_label: dep.alternate_label.clone(),
            has_subdepartments: dep.has_subdepartments,
            parent,
            ..Self::default()
        }
    }

    fn for_filter_option(option: &FilterOption, filter_id: &str, parent: NodeId) -> Self {
        Self {
            id: option.id.clone(),
            label: option.label.clone(),
            filter_id: filter_id.to_string(),
            is_filter: true,
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Department hierarchy stored in an arena.
///
/// Parents own their children; `parent` links are plain handles used only
/// for upward traversal. Replacing a subtree releases every node below it.
#[derive(Debug, Clone)]
pub struct DepartmentTree {
    nodes: Vec<Option<DepartmentNode>>,
    free: Vec<usize>,
    root: NodeId,
}

/// Construction.
impl DepartmentTree {
    pub fn from_department(dep: &Department) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.build(dep, None);
        if let Some(root) = tree.node_mut(tree.root) {
            root.is_root = true;
        }
        tree
    }

    /// Hidden root with one child per option; `None` unless `filter` is an option selector.
    pub fn from_filter(filter: &Filter) -> Option<Self> {
        let FilterKind::OptionSelector { label, options, .. } = &filter.kind else {
            return None;
        };
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        let root = tree.alloc(DepartmentNode {
            filter_id: filter.id.clone(),
            label: label.clone(),
            has_subdepartments: !options.is_empty(),
            is_root: true,
            hidden: true,
            is_filter: true,
            ..DepartmentNode::default()
        });
        tree.root = root;
        for option in options {
            let child = tree.alloc(DepartmentNode::for_filter_option(option, &filter.id, root));
            if let Some(node) = tree.node_mut(root) {
                node.children.push(child);
            }
        }
        Some(tree)
    }

    fn build(&mut self, dep: &Department, parent: Option<NodeId>) -> NodeId {
        let id = self.alloc(DepartmentNode::for_department(dep, parent));
        for sub in &dep.subdepartments {
            let child = self.build(sub, Some(id));
            if let Some(node) = self.node_mut(id) {
                node.children.push(child);
            }
        }
        id
    }

    fn alloc(&mut self, node: DepartmentNode) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.free.push(id.0);
        for child in node.children {
            self.release(child);
        }
    }
}

/// Read operations.
impl DepartmentTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DepartmentNode> {
        self.nodes.get(id.0)?.as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DepartmentNode> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// No children cached and none announced.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| n.children.is_empty() && !n.has_subdepartments)
    }

    /// Depth-first search from the root.
    pub fn find_node_by_id(&self, department_id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if node.id == department_id {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutation operations.
impl DepartmentTree {
    /// Re-initialises `id` from `dep`, dropping its old subtree wholesale.
    ///
    /// The node keeps its handle, parent link and root flag.
    pub fn initialize_for_department(&mut self, id: NodeId, dep: &Department) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let old_children = std::mem::take(&mut node.children);
        node.id = dep.id.clone();
        node.label = dep.label.clone();
        node.all_label = dep.alternate_label.clone();
        node.has_subdepartments = dep.has_subdepartments;
        node.filter_id.clear();
        node.hidden = false;
        node.is_filter = false;

        for child in old_children {
            self.release(child);
        }
        for sub in &dep.subdepartments {
            let child = self.build(sub, Some(id));
            if let Some(node) = self.node_mut(id) {
                node.children.push(child);
            }
        }
    }

    pub fn set_is_root(&mut self, id: NodeId, is_root: bool) {
        if let Some(node) = self.node_mut(id) {
            node.is_root = is_root;
        }
    }
}
