//! Trie node definitions.

use serde::{Deserialize, Serialize};

use crate::key::Key;

/// Handle to a node in a [`Trie`](super::Trie).
///
/// Handles are generational: once the node is removed, the handle goes stale
/// and never aliases whatever node later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// How a node's children relate to one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExclusionMode {
    /// Nothing has been stored under this node yet.
    #[default]
    Empty,
    /// At most one child (a functional relation).
    Exclusive,
    /// Any number of distinct children.
    NonExclusive,
}

/// The kind of link from a node to a child, as written in path notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    /// `+`
    NonExclusive,
    /// `-`
    Exclusive,
}

impl Link {
    pub fn symbol(&self) -> char {
        match self {
            Link::NonExclusive => '+',
            Link::Exclusive => '-',
        }
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single trie entry.
#[derive(Debug, Clone)]
pub struct Node {
    /// `None` only for the root.
    pub(crate) key: Option<Key>,

    /// Back-reference used for naming and for locating sibling lists.
    pub(crate) parent: Option<NodeId>,

    /// Insertion-ordered children.
    pub(crate) children: Vec<NodeId>,

    pub(crate) mode: ExclusionMode,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, key: Option<Key>) -> Self {
        Self {
            key,
            parent,
            children: Vec::new(),
            mode: ExclusionMode::Empty,
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mode(&self) -> ExclusionMode {
        self.mode
    }

    /// Check if this is the root node.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
