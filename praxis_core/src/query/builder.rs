//! Fluent construction of primitive query chains.

use crate::trie::{Link, NodeId};
use crate::variable::{Bindings, Term};

use super::PrimitiveQuery;

/// Builds a [`PrimitiveQuery`] one path step at a time.
///
/// A literal step matches that key. A variable step captures into the
/// variable if this is the variable's first use in `env`, and filters on its
/// bound value otherwise.
pub struct QueryBuilder<'e> {
    env: &'e mut Bindings,
    query: PrimitiveQuery,
}

impl<'e> QueryBuilder<'e> {
    /// Start a chain whose only initial solution is `start` (usually the root).
    pub fn new(start: NodeId, env: &'e mut Bindings) -> Self {
        Self {
            env,
            query: PrimitiveQuery::singleton(start),
        }
    }

    /// Continue an existing chain.
    pub fn extend(query: PrimitiveQuery, env: &'e mut Bindings) -> Self {
        Self { env, query }
    }

    /// Match a non-exclusive child (`+`).
    pub fn child(self, term: impl Into<Term>) -> Self {
        self.step(Link::NonExclusive, term.into())
    }

    /// Match an exclusive child (`-`).
    ///
    /// Matching is identical to [`child`](Self::child); the link only
    /// changes how the query is rendered.
    pub fn exclusive(self, term: impl Into<Term>) -> Self {
        self.step(Link::Exclusive, term.into())
    }

    pub fn step(mut self, link: Link, term: Term) -> Self {
        let parent = self.query;
        self.query = match term {
            Term::Key(key) => PrimitiveQuery::constant(parent, link, key),
            Term::Var(var) => {
                if self.env.claim(&var) {
                    PrimitiveQuery::capture(parent, link, var)
                } else {
                    PrimitiveQuery::filter(parent, link, var)
                }
            }
        };
        self
    }

    pub fn build(self) -> PrimitiveQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Trie;

    #[test]
    fn test_first_use_captures_then_filters() {
        let trie = Trie::new();
        let mut env = Bindings::new();
        let x = env.variable("x");

        let first = QueryBuilder::new(trie.root(), &mut env).child(&x).build();
        let second = QueryBuilder::new(trie.root(), &mut env).child(&x).build();

        assert!(matches!(first, PrimitiveQuery::Capture(_)));
        assert!(matches!(second, PrimitiveQuery::Filter(_)));
        assert!(env.is_used(&x));
    }

    #[test]
    fn test_literal_steps_are_constants() {
        let trie = Trie::new();
        let mut env = Bindings::new();

        let query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .exclusive(42)
            .build();
        assert!(matches!(query, PrimitiveQuery::Constant(_)));
        assert_eq!(query.to_string(), "John-42");
    }

    #[test]
    fn test_extend_existing_chain() {
        let trie = Trie::new();
        let mut env = Bindings::new();

        let base = QueryBuilder::new(trie.root(), &mut env).child("John").build();
        let query = QueryBuilder::extend(base, &mut env).child("loves").build();
        assert_eq!(query.to_string(), "John+loves");
    }
}
