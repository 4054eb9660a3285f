//! Generational arena that owns every render node.
//!
//! Slots are allocated in fixed-size chunks that never move once created,
//! so growing the tree never relocates existing nodes. Released slots go on
//! a free list and are reused in O(1). Every slot carries a generation
//! counter that is bumped on release; a [`NodeId`] minted before the release
//! no longer matches and resolves to `None` instead of to the new occupant.

use std::fmt;

use koala_common::Rect;
use thiserror::Error;

use crate::node::RenderNode;

/// Slots per chunk.
const CHUNK_SIZE: usize = 64;

/// A generational handle to a node in a [`RenderTree`].
///
/// Ids are cheap to copy and never keep a node alive. Use
/// [`RenderTree::is_alive`] to check whether the node still exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// Slot index inside the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation the slot had when this id was minted.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// Errors from structural tree edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The id refers to a node that has been released.
    #[error("node {0:?} has been released")]
    StaleNode(NodeId),
    /// The child is already attached somewhere else.
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The would-be parent.
        parent: NodeId,
        /// The would-be child.
        child: NodeId,
    },
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<RenderNode>,
    next_free: Option<usize>,
}

/// Arena-based render tree with O(1) allocate, release, and lookup.
#[derive(Debug, Default)]
pub struct RenderTree {
    /// Each chunk is allocated with `CHUNK_SIZE` capacity and never grows past it.
    chunks: Vec<Vec<Slot>>,
    free_head: Option<usize>,
    len: usize,
    root: Option<NodeId>,
}

impl RenderTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, index: usize) -> Option<&Slot> {
        self.chunks.get(index / CHUNK_SIZE)?.get(index % CHUNK_SIZE)
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.chunks
            .get_mut(index / CHUNK_SIZE)?
            .get_mut(index % CHUNK_SIZE)
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no live nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots allocated so far (live + free).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * CHUNK_SIZE
    }

    /// Store a node and return its id. The node starts detached.
    pub fn alloc(&mut self, mut node: RenderNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.len += 1;

        if let Some(index) = self.free_head
            && let Some(slot) = self.slot_mut(index)
        {
            let next_free = slot.next_free.take();
            slot.node = Some(node);
            let id = NodeId {
                index,
                generation: slot.generation,
            };
            self.free_head = next_free;
            return id;
        }

        if self.chunks.last().is_none_or(|chunk| chunk.len() == CHUNK_SIZE) {
            self.chunks.push(Vec::with_capacity(CHUNK_SIZE));
        }
        let chunk_index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_index];
        chunk.push(Slot {
            generation: 0,
            node: Some(node),
            next_free: None,
        });
        NodeId {
            index: chunk_index * CHUNK_SIZE + chunk.len() - 1,
            generation: 0,
        }
    }

    /// Whether `id` still refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get a node by id; `None` if it has been released.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&RenderNode> {
        self.slot(id.index)
            .filter(|slot| slot.generation == id.generation)?
            .node
            .as_ref()
    }

    /// Get a mutable node by id; `None` if it has been released.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.slot_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?
            .node
            .as_mut()
    }

    /// The root node used for top-level paints.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StaleNode`] if `id` has been released.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(id) {
            return Err(TreeError::StaleNode(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Allocate `node` and append it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StaleNode`] if `parent` has been released.
    pub fn append_new(&mut self, parent: NodeId, node: RenderNode) -> Result<NodeId, TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        let child = self.alloc(node);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either node has been released, `child` is already attached,
    /// or `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        let child_node = self.get(child).ok_or(TreeError::StaleNode(child))?;
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        if parent == child || self.ancestors(parent).any(|id| id == child) {
            return Err(TreeError::Cycle { parent, child });
        }

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Release `id` and its whole subtree.
    ///
    /// The node is detached from its parent first. Returns `false` (and does
    /// nothing) if `id` was already released.
    pub fn release(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.get(id).map(|node| node.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let free_head = self.free_head;
            let Some(slot) = self
                .slot_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            slot.next_free = free_head;
            self.free_head = Some(current.index);
            self.len -= 1;
            pending.extend(node.children);
        }
        true
    }

    /// Children of `id` in paint order (empty for released ids).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], RenderNode::children)
    }

    /// Parent of `id`, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// The frame of `id` translated into the root's coordinate space.
    ///
    /// Each frame is local to its parent's frame origin. Node transforms are
    /// not applied, so this is the untransformed layout position.
    #[must_use]
    pub fn frame_in_root(&self, id: NodeId) -> Option<Rect> {
        let frame = self.get(id)?.frame;
        let (dx, dy) = self
            .ancestors(id)
            .filter_map(|ancestor| self.get(ancestor))
            .fold((0.0, 0.0), |(dx, dy), node| (dx + node.frame.x, dy + node.frame.y));
        Some(frame.translate(dx, dy))
    }

    /// Mark `id` and all of its descendants as needing repaint.
    pub fn mark_subtree_dirty(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.get_mut(current) {
                node.needs_repaint = true;
                pending.extend_from_slice(&node.children);
            }
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a RenderTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
