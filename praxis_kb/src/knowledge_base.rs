//! The knowledge base handle.

use tracing::{debug, trace};

use praxis_core::{
    Bindings, Key, Link, NodeId, Predicate, PrimitiveQuery, Query, QueryBuilder, Rule, RuleSet,
    Store, Term, Trie, Variable,
};

use crate::config::KbConfig;
use crate::error::Result;
use crate::notation::Path;

/// An exclusion-logic knowledge base.
///
/// Owns the fact trie and the binding environment shared by every query and
/// rule built from it. Every evaluating method takes `&mut self`, so only one
/// query runs at a time.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    config: KbConfig,
    trie: Trie,
    env: Bindings,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Create an empty knowledge base with default settings.
    pub fn new() -> Self {
        Self::with_config(KbConfig::default())
    }

    pub fn with_config(config: KbConfig) -> Self {
        debug!(
            kb = %config.name,
            overwrite_exclusive = config.overwrite_exclusive,
            "created knowledge base"
        );
        Self {
            trie: Trie::new().with_literal_overwrite(config.overwrite_exclusive),
            env: Bindings::new(),
            config,
        }
    }

    /// Create a knowledge base configured from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(Self::with_config(KbConfig::from_toml_str(text)?))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn bindings(&self) -> &Bindings {
        &self.env
    }

    /// Allocate a fresh, unused variable.
    pub fn variable(&mut self, name: impl Into<String>) -> Variable {
        self.env.variable(name)
    }

    /// Start an assertion chain at the root.
    pub fn store(&mut self) -> Store<'_> {
        Store::new(&mut self.trie, &self.env)
    }

    /// Start a query chain at the root.
    pub fn query(&mut self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.trie.root(), &mut self.env)
    }

    /// Remove the first match of `query`. Returns whether anything was removed.
    pub fn retract(&mut self, query: &mut PrimitiveQuery) -> Result<bool> {
        Ok(query.delete_first(&mut self.trie, &mut self.env)?)
    }

    /// Remove every match of `query`, returning the number of entries removed.
    pub fn retract_all(&mut self, query: &mut PrimitiveQuery) -> Result<usize> {
        Ok(query.delete_all(&mut self.trie, &mut self.env)?)
    }

    /// Drop every fact. Variables and their used flags are kept, but queries
    /// built before the clear start from a stale root and find nothing.
    pub fn clear(&mut self) {
        let nodes = self.trie.len();
        self.trie.clear();
        debug!(kb = %self.config.name, nodes, "cleared knowledge base");
    }

    pub fn holds<Q: Query + ?Sized>(&mut self, query: &mut Q) -> Result<bool> {
        Ok(query.holds(&self.trie, &mut self.env)?)
    }

    /// Value of `var` in the first solution of `query`.
    pub fn find<Q: Query + ?Sized>(&mut self, query: &mut Q, var: &Variable) -> Result<Key> {
        Ok(query.find(&self.trie, &mut self.env, var)?)
    }

    pub fn find_all<Q: Query + ?Sized>(
        &mut self,
        query: &mut Q,
        var: &Variable,
    ) -> Result<Vec<Key>> {
        Ok(query.find_all(&self.trie, &mut self.env, var)?)
    }

    pub fn find_all_unique<Q: Query + ?Sized>(
        &mut self,
        query: &mut Q,
        var: &Variable,
    ) -> Result<Vec<Key>> {
        Ok(query.find_all_unique(&self.trie, &mut self.env, var)?)
    }

    /// Run `action` once per solution of `query`. The action may assert new
    /// facts; they are visible to later solutions of the same enumeration.
    pub fn do_all<Q, F>(&mut self, query: &mut Q, mut action: F) -> Result<usize>
    where
        Q: Query + ?Sized,
        F: FnMut(&mut Trie, &mut Bindings) -> praxis_core::Result<()>,
    {
        Ok(query.do_all(&mut self.trie, &mut self.env, &mut action)?)
    }

    /// Test that two already-used variables are bound to the same value.
    pub fn equal(&self, a: &Variable, b: &Variable) -> Result<Predicate> {
        Ok(a.equal(b, &self.env)?)
    }

    pub fn not_equal(&self, a: &Variable, b: &Variable) -> Result<Predicate> {
        Ok(a.not_equal(b, &self.env)?)
    }

    pub fn run_rule(&mut self, rule: &mut Rule) -> Result<usize> {
        Ok(rule.run(&mut self.trie, &mut self.env)?)
    }

    /// Run every rule of the set once, in order.
    pub fn run_rules(&mut self, rules: &mut RuleSet) -> Result<usize> {
        Ok(rules.run(&mut self.trie, &mut self.env)?)
    }

    /// Assert a fact written in path notation, returning its leaf node.
    pub fn assert_path(&mut self, text: &str) -> Result<NodeId> {
        let path: Path = text.parse()?;
        let mut store = self.store().child(path.first())?;
        for (link, key) in path.steps() {
            store = match link {
                Link::NonExclusive => store.child(key)?,
                Link::Exclusive => store.exclusive(key)?,
            };
        }
        trace!(fact = %path, "asserted path");
        Ok(store.node())
    }

    /// Build a ground query from path notation.
    pub fn query_path(&mut self, text: &str) -> Result<PrimitiveQuery> {
        let path: Path = text.parse()?;
        let builder = path
            .steps()
            .iter()
            .fold(self.query().child(path.first()), |builder, (link, key)| {
                builder.step(*link, Term::Key(key.clone()))
            });
        Ok(builder.build())
    }

    /// Whether a fact written in path notation is stored.
    pub fn holds_path(&mut self, text: &str) -> Result<bool> {
        let mut query = self.query_path(text)?;
        self.holds(&mut query)
    }
}
