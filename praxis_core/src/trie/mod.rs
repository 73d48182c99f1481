//! Fact trie - the only mutable state of the knowledge base.
//!
//! A fact `John+loves+Mary` is a path of keys from the root. Each node's
//! children are either all non-exclusive (any number of distinct keys) or a
//! single exclusive child; mixing the two under one node is an
//! [`Exclusion`](crate::KbError::Exclusion) error.
//!
//! Nodes live in a generational arena so parent back-references and query
//! cursors can hold plain [`NodeId`]s.

mod node;
mod store;

pub use node::*;
pub use store::*;

use tracing::trace;

use crate::error::{KbError, Result};
use crate::key::Key;
use crate::variable::Bindings;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The fact trie.
#[derive(Debug, Clone)]
pub struct Trie {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
    /// Whether an exclusive store of a literal key replaces a differing key.
    overwrite_literals: bool,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create a trie holding only an empty root.
    pub fn new() -> Self {
        let mut trie = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            live: 0,
            overwrite_literals: true,
        };
        trie.root = trie.alloc(None, None);
        trie
    }

    /// Set the literal exclusive-store policy.
    ///
    /// When off, storing a literal key under an exclusive node that already
    /// holds a different key fails instead of overwriting. Stores whose key
    /// comes from a variable always overwrite.
    pub fn with_literal_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_literals = overwrite;
        self
    }

    pub fn overwrites_literals(&self) -> bool {
        self.overwrite_literals
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node, or `None` if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Check if the handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn key(&self, id: NodeId) -> Option<&Key> {
        self.get(id).and_then(Node::key)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of the node, empty for a stale handle.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn mode(&self, id: NodeId) -> ExclusionMode {
        self.get(id).map(Node::mode).unwrap_or_default()
    }

    /// First child of `id` whose key equals `key`.
    pub fn find_child(&self, id: NodeId, key: &Key) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.key(*child) == Some(key))
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if nothing has been stored under the root.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Begin a fluent assertion chain at the root.
    pub fn store<'a>(&'a mut self, env: &'a Bindings) -> Store<'a> {
        Store::new(self, env)
    }

    /// Store `key` as a non-exclusive child of `id`.
    ///
    /// Returns the existing child if one with an equal key is already present.
    pub fn store_non_exclusive(&mut self, id: NodeId, key: Key) -> Result<NodeId> {
        let mode = self.get(id).ok_or(KbError::StaleNode)?.mode;
        match mode {
            ExclusionMode::Exclusive => {
                return Err(self.exclusion(id, "Non-exclusive store on exclusive node"));
            }
            ExclusionMode::NonExclusive => {
                if let Some(existing) = self.find_child(id, &key) {
                    return Ok(existing);
                }
            }
            ExclusionMode::Empty => {}
        }

        trace!(key = %key, "storing non-exclusive child");
        let child = self.alloc(Some(id), Some(key));
        if let Some(node) = self.get_mut(id) {
            node.mode = ExclusionMode::NonExclusive;
            node.children.push(child);
        }
        Ok(child)
    }

    /// Store `key` as the exclusive child of `id`.
    ///
    /// With `overwrite` set, the existing child takes `key` and loses
    /// everything below it, even when the key is unchanged. Without it,
    /// storing the key already present is a no-op and a differing key is an
    /// exclusion error.
    pub fn store_exclusive(&mut self, id: NodeId, key: Key, overwrite: bool) -> Result<NodeId> {
        let node = self.get(id).ok_or(KbError::StaleNode)?;
        let (mode, first) = (node.mode, node.children.first().copied());
        match (mode, first) {
            (ExclusionMode::NonExclusive, _) => {
                Err(self.exclusion(id, "Exclusive store on non-exclusive node"))
            }
            (ExclusionMode::Exclusive, Some(existing)) => {
                if overwrite {
                    trace!(key = %key, "overwriting exclusive child");
                    self.overwrite(existing, key);
                    return Ok(existing);
                }
                if self.key(existing) != Some(&key) {
                    return Err(self.exclusion(id, "Exclusive store doesn't match previous store"));
                }
                Ok(existing)
            }
            // Empty, or exclusive with its only child retracted.
            _ => {
                trace!(key = %key, "storing exclusive child");
                let child = self.alloc(Some(id), Some(key));
                if let Some(node) = self.get_mut(id) {
                    node.mode = ExclusionMode::Exclusive;
                    node.children.push(child);
                }
                Ok(child)
            }
        }
    }

    /// Remove `child` (and everything below it) from `parent`'s children.
    ///
    /// The parent keeps its exclusion mode even if this leaves it childless.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let Some(position) = node.children.iter().position(|c| *c == child) else {
            return false;
        };
        node.children.remove(position);
        let freed = self.release(child);
        trace!(freed, "removed child");
        true
    }

    /// Remove every child of `id`, returning how many direct children went.
    pub fn clear_children(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get_mut(id) else {
            return 0;
        };
        let children = std::mem::take(&mut node.children);
        let count = children.len();
        let freed: usize = children.into_iter().map(|child| self.release(child)).sum();
        trace!(count, freed, "cleared children");
        count
    }

    /// Discard every fact. All previously issued handles go stale.
    pub fn clear(&mut self) {
        let root = self.root;
        self.release(root);
        self.root = self.alloc(None, None);
    }

    /// Canonical path of the node, e.g. `John+mother-Betty`.
    pub fn name(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return "<stale node>".to_string();
        };
        if node.is_root() {
            return "<root>".to_string();
        }

        // (link from parent, key), leaf first
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(node) = self.get(current) {
            let Some(parent) = node.parent else { break };
            let link = match self.mode(parent) {
                ExclusionMode::Exclusive => Link::Exclusive,
                _ => Link::NonExclusive,
            };
            segments.push((link, node.key.as_ref()));
            current = parent;
        }

        let mut name = String::new();
        for (i, (link, key)) in segments.iter().rev().enumerate() {
            if i > 0 {
                name.push(link.symbol());
            }
            if let Some(key) = key {
                name.push_str(&key.to_string());
            }
        }
        name
    }

    fn exclusion(&self, id: NodeId, reason: &str) -> KbError {
        KbError::Exclusion {
            node: self.name(id),
            reason: reason.to_string(),
        }
    }

    fn overwrite(&mut self, id: NodeId, key: Key) {
        let children = match self.get_mut(id) {
            Some(node) => {
                node.key = Some(key);
                node.mode = ExclusionMode::Empty;
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in children {
            self.release(child);
        }
    }

    fn alloc(&mut self, parent: Option<NodeId>, key: Option<Key>) -> NodeId {
        let node = Node::new(parent, key);
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Free the node and its whole subtree, returning the number of nodes freed.
    fn release(&mut self, id: NodeId) -> usize {
        let mut freed = 0;
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            // A slot whose generation is used up is retired rather than reused.
            if let Some(next) = slot.generation.checked_add(1) {
                slot.generation = next;
                self.free.push(id.index);
            }
            self.live -= 1;
            freed += 1;
            pending.extend(node.children);
        }
        freed
    }
}
