//! Fluent assertion chains over the trie.

use crate::error::Result;
use crate::trie::{NodeId, Trie};
use crate::variable::{Bindings, Term};

/// A cursor that asserts one path step at a time.
///
/// Each step mutates the trie immediately, so a chain that fails half way
/// leaves its successful prefix stored.
///
/// ```
/// use praxis_core::{Bindings, Trie};
///
/// let mut trie = Trie::new();
/// let env = Bindings::new();
/// let betty = trie
///     .store(&env)
///     .child("John")?
///     .child("mother")?
///     .exclusive("Betty")?;
/// assert_eq!(betty.name(), "John+mother-Betty");
/// # Ok::<(), praxis_core::KbError>(())
/// ```
pub struct Store<'a> {
    trie: &'a mut Trie,
    env: &'a Bindings,
    node: NodeId,
}

impl<'a> Store<'a> {
    /// Start at the root.
    pub fn new(trie: &'a mut Trie, env: &'a Bindings) -> Self {
        let node = trie.root();
        Self { trie, env, node }
    }

    /// Store a non-exclusive child and move to it.
    pub fn child(mut self, term: impl Into<Term>) -> Result<Self> {
        let key = term.into().resolve(self.env)?;
        self.node = self.trie.store_non_exclusive(self.node, key)?;
        Ok(self)
    }

    /// Store an exclusive child and move to it.
    ///
    /// A variable's value always overwrites; a literal follows the trie's
    /// literal overwrite policy.
    pub fn exclusive(mut self, term: impl Into<Term>) -> Result<Self> {
        let term = term.into();
        let overwrite = match term {
            Term::Var(_) => true,
            Term::Key(_) => self.trie.overwrites_literals(),
        };
        let key = term.resolve(self.env)?;
        self.node = self.trie.store_exclusive(self.node, key, overwrite)?;
        Ok(self)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> String {
        self.trie.name(self.node)
    }
}

impl std::fmt::Debug for Store<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("node", &self.name()).finish()
    }
}
