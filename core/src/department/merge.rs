use crate::department::{DepartmentTree, NodeId};
use crate::types::Department;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The delivered root was unknown, the whole tree was rebuilt from it.
    Rebuilt,
    /// The subtree at this node was replaced.
    Replaced(NodeId),
    Unchanged,
}

impl DepartmentTree {
    /// Merges a possibly partial delivery into the cached tree.
    ///
    /// Only the smallest subtree that actually differs is replaced, so cached
    /// branches the delivery does not mention survive. `active_id` is the
    /// department currently browsed.
    pub fn merge(&mut self, incoming: &Department, active_id: &str) -> MergeOutcome {
        let Some(start) = self.find_node_by_id(&incoming.id) else {
            *self = DepartmentTree::from_department(incoming);
            return MergeOutcome::Rebuilt;
        };
        match find_update_node(self, start, incoming, active_id) {
            Some((node, dep)) => {
                self.initialize_for_department(node, dep);
                let root = self.root();
                self.set_is_root(root, true);
                MergeOutcome::Replaced(node)
            }
            None => MergeOutcome::Unchanged,
        }
    }
}

/// Finds the node whose subtree must be replaced to absorb `incoming`.
///
/// Returns the cached node together with the delivered subtree that replaces
/// it, or `None` when the cache already agrees with the delivery.
pub fn find_update_node<'a>(
    tree: &DepartmentTree,
    node: NodeId,
    incoming: &'a Department,
    active_id: &str,
) -> Option<(NodeId, &'a Department)> {
    let cached = tree.node(node)?;
    if cached.id != incoming.id {
        return Some((node, incoming));
    }

    let cached_children: HashMap<&str, NodeId> = tree
        .children(node)
        .iter()
        .filter_map(|&c| Some((tree.node(c)?.id.as_str(), c)))
        .collect();

    let mut matched = Vec::with_capacity(incoming.subdepartments.len());
    for sub in &incoming.subdepartments {
        match cached_children.get(sub.id.as_str()) {
            Some(&child) => matched.push((child, sub)),
            None => return Some((node, incoming)),
        }
    }

    // The browsed node lost a child.
    if cached.id == active_id && cached_children.len() > incoming.subdepartments.len() {
        return Some((node, incoming));
    }

    for (child, sub) in &matched {
        let Some(c) = tree.node(*child) else {
            return Some((node, incoming));
        };
        if c.label != sub.label
            || c.all_label != sub.alternate_label
            || c.has_subdepartments != sub.has_subdepartments
        {
            return Some((node, incoming));
        }
    }

    let mut updates = matched
        .into_iter()
        .filter_map(|(child, sub)| find_update_node(tree, child, sub, active_id));
    let first = updates.next()?;
    if updates.next().is_some() {
        return Some((node, incoming));
    }
    Some(first)
}
