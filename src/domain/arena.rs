use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Tag given to the root element when none is configured.
pub const DEFAULT_ROOT_TAG: &str = "html";

/// One markup element: a tag label, a text payload and its links into the tree.
///
/// Links are arena indices. `first_child` and `next_sibling` form the ordered,
/// singly-linked child list of a parent; `parent` is only ever used for upward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    /// Element name, not unique across the tree
    pub tag: String,
    /// Text payload, empty means "no text"
    pub content: String,
    parent: Option<Index>,
    first_child: Option<Index>,
    next_sibling: Option<Index>,
}

impl DomNode {
    /// Creates a detached node. It becomes part of a tree only through
    /// [`DomTree::insert_child`], which takes it by value.
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    /// Creates a detached node without content.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(tag, String::new())
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn first_child(&self) -> Option<Index> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<Index> {
        self.next_sibling
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

impl fmt::Display for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag)
    }
}

/// Arena-backed markup tree.
///
/// Every node reachable from the root lives in the arena and nothing else is stored
/// there, so dropping the tree releases each node exactly once. Removed nodes free
/// their slot; indices that still point at them fail the generation check.
#[derive(Debug, Clone)]
pub struct DomTree {
    arena: Arena<DomNode>,
    root: Index,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TAG)
    }
}

impl DomTree {
    pub fn new(root_tag: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(DomNode::element(root_tag));
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get(&self, idx: Index) -> Option<&DomNode> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Index) -> Option<&mut DomNode> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    fn node(&self, idx: Index) -> DomainResult<&DomNode> {
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::InvalidTarget("node no longer exists".to_string()))
    }

    /// Appends `node` as the last child of `parent` and returns its index.
    ///
    /// Fails with `NotFound` if `parent` is not part of the tree; the node is dropped
    /// and the tree is left unchanged.
    #[instrument(level = "trace", skip(self, node), fields(tag = %node.tag))]
    pub fn insert_child(&mut self, parent: Index, mut node: DomNode) -> DomainResult<Index> {
        if !self.arena.contains(parent) {
            return Err(DomainError::NotFound("parent node".to_string()));
        }
        node.parent = None;
        node.first_child = None;
        node.next_sibling = None;
        let idx = self.arena.insert(node);
        self.link_last(parent, idx);
        Ok(idx)
    }

    /// Links an already stored, unlinked node after the last child of `parent`.
    fn link_last(&mut self, parent: Index, child: Index) {
        match self.last_child(parent) {
            Some(last) => {
                if let Some(last) = self.arena.get_mut(last) {
                    last.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(parent) = self.arena.get_mut(parent) {
                    parent.first_child = Some(child);
                }
            }
        }
        if let Some(child) = self.arena.get_mut(child) {
            child.parent = Some(parent);
        }
    }

    /// Unlinks `idx` from its parent's child list without releasing anything.
    /// Afterwards the node has neither parent nor next sibling; its children stay attached.
    fn detach(&mut self, idx: Index) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        let (parent, next) = (node.parent, node.next_sibling);

        if let Some(parent) = parent {
            let is_first = self
                .arena
                .get(parent)
                .is_some_and(|p| p.first_child == Some(idx));
            if is_first {
                if let Some(parent) = self.arena.get_mut(parent) {
                    parent.first_child = next;
                }
            } else {
                let prev = self
                    .children(parent)
                    .find(|&c| self.arena.get(c).is_some_and(|n| n.next_sibling == Some(idx)));
                if let Some(prev) = prev.and_then(|p| self.arena.get_mut(p)) {
                    prev.next_sibling = next;
                }
            }
        }

        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
            node.next_sibling = None;
        }
    }

    /// Removes `idx` and its whole subtree, returning the number of released nodes.
    ///
    /// The root cannot be removed. The node is spliced out of its sibling chain before
    /// anything is released, so the release walk only follows sibling links that
    /// belong to the detached subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> DomainResult<usize> {
        if idx == self.root {
            return Err(DomainError::InvalidTarget(
                "cannot remove the root node".to_string(),
            ));
        }
        self.node(idx)?;
        self.detach(idx);

        let mut released = 0;
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                trace!(tag = %node.tag, "released");
                released += 1;
                stack.extend(node.first_child);
                stack.extend(node.next_sibling);
            }
        }
        debug!(released, "subtree removed");
        Ok(released)
    }

    /// Relocates `idx` with its subtree to become the last child of `new_parent`.
    ///
    /// Rejects moving the root and moving a node below itself or one of its
    /// descendants; in both cases the tree is unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn move_subtree(&mut self, idx: Index, new_parent: Index) -> DomainResult<()> {
        if idx == self.root {
            return Err(DomainError::InvalidTarget(
                "cannot move the root node".to_string(),
            ));
        }
        let node = self.node(idx)?;
        let target = self.node(new_parent)?;
        if idx == new_parent || self.is_ancestor(idx, new_parent) {
            return Err(DomainError::CyclicMove {
                node: node.tag.clone(),
                new_parent: target.tag.clone(),
            });
        }

        self.detach(idx);
        self.link_last(new_parent, idx);
        Ok(())
    }

    /// Replaces the content of `idx`.
    pub fn set_content(&mut self, idx: Index, content: impl Into<String>) -> DomainResult<()> {
        let node = self
            .arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::InvalidTarget("node no longer exists".to_string()))?;
        node.content = content.into();
        Ok(())
    }

    /// True if `ancestor` is a strict ancestor of `idx`.
    pub fn is_ancestor(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = self.get(idx).and_then(|n| n.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.get(p).and_then(|n| n.parent);
        }
        false
    }

    /// Finds the first node with the given tag.
    ///
    /// Tags are not unique: the search runs in pre-order (a node, then its children,
    /// then its next sibling) and the first match wins.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_tag(&self, tag: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.tag == tag)
            .map(|(idx, _)| idx)
    }

    /// All nodes with the given tag, in pre-order.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.tag == tag)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get(idx).and_then(|n| n.parent)
    }

    /// Direct children of `idx` in insertion order.
    pub fn children(&self, idx: Index) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(idx).and_then(|n| n.first_child),
        }
    }

    pub fn last_child(&self, idx: Index) -> Option<Index> {
        self.children(idx).last()
    }

    /// Pre-order traversal of the whole tree.
    pub fn iter(&self) -> PreOrder<'_> {
        self.descendants(self.root)
    }

    /// Pre-order traversal of the subtree rooted at `start`, `start` included.
    pub fn descendants(&self, start: Index) -> PreOrder<'_> {
        let stack = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        PreOrder {
            tree: self,
            start,
            stack,
        }
    }

    /// Total number of nodes, root included.
    #[instrument(level = "debug", skip(self))]
    pub fn count_nodes(&self) -> usize {
        self.iter().count()
    }

    /// Number of nodes in the subtree rooted at `idx`, 0 for a stale index.
    pub fn subtree_size(&self, idx: Index) -> usize {
        self.descendants(idx).count()
    }

    /// Number of levels in the tree; a lone root has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.children(idx).map(|child| (child, level + 1)));
        }
        deepest
    }
}

/// Iterator over the child list of one node.
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<Index>,
}

impl Iterator for Children<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Depth-first pre-order iterator: node, children, then next sibling.
///
/// The sibling link of the start node is never followed.
pub struct PreOrder<'a> {
    tree: &'a DomTree,
    start: Index,
    stack: Vec<Index>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (Index, &'a DomNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if current != self.start {
                    self.stack.extend(node.next_sibling);
                }
                // Child goes on top so it is visited before the sibling
                self.stack.extend(node.first_child);
                return Some((current, node));
            }
        }
        None
    }
}
