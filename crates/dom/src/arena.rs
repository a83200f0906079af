//! Arena-based DOM tree storage
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! No Rc/Arc, no recursion, nodes stored sequentially. Queries walk the
//! tree with an explicit stack in document order (pre-order, left to
//! right), which is the order `querySelector` resolves "first match" in.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// `id` attribute → NodeId lookup. First insertion wins, and snapshot
    /// parsing inserts in document order, so duplicates resolve the way
    /// `getElementById` does.
    id_index: AHashMap<String, NodeId>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
            id_index: AHashMap::new(),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its assigned ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if node.is_element() {
            if let Some(id) = node.attr("id") {
                self.id_index.entry(id.to_string()).or_insert(node_id);
            }
        }
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Traverse tree depth-first in document order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// First strict descendant of `scope` matching the predicate, in
    /// document order. The scope node itself is never a candidate, and
    /// the walk stops at the first hit.
    pub fn find_first_within<F>(&self, scope: NodeId, mut predicate: F) -> Result<Option<NodeId>>
    where
        F: FnMut(&DomNode) -> bool,
    {
        let scope_node = self.get(scope)?;
        let mut stack: Vec<NodeId> = Vec::with_capacity(scope_node.children_ids.len());
        for &child_id in scope_node.children_ids.iter().rev() {
            stack.push(child_id);
        }

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            if predicate(node) {
                return Ok(Some(node_id));
            }
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(None)
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// First element with the given tag name, in document order
    pub fn first_by_tag(&self, tag: &str) -> Result<Option<NodeId>> {
        let Some(root_id) = self.root_id else {
            return Ok(None);
        };
        if self.get(root_id)?.tag_is(tag) {
            return Ok(Some(root_id));
        }
        self.find_first_within(root_id, |node| node.tag_is(tag))
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
