//! Query engine - composable cursors over the fact trie.
//!
//! Every query is an external cursor: [`Query::reset`] rewinds it to before
//! its first solution and [`Query::try_next`] advances to the next one,
//! updating the bindings of any variables it captures as a side effect.
//! Because callers drive the cursor explicitly, a conjunction is a plain
//! nested loop: for each solution of the left query the right query is reset
//! and enumerated, seeing whatever the left query most recently bound.
//!
//! Query objects are built once and reused across passes; nothing is
//! reallocated between a `reset` and the end of enumeration.

mod builder;
mod combinator;
mod primitive;

pub use builder::*;
pub use combinator::*;
pub use primitive::*;

use std::fmt;

use crate::error::{KbError, Result};
use crate::key::Key;
use crate::trie::Trie;
use crate::variable::{Bindings, Variable};

/// The reset/advance protocol shared by every query.
pub trait Query {
    /// Rewind to before the first solution.
    fn reset(&mut self);

    /// Advance to the next solution, returning false once exhausted.
    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool>;

    /// Write the query in `key+key+key` notation.
    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn name(&self) -> String {
        QueryName(self).to_string()
    }

    /// Whether the query has at least one solution. Takes at most one step.
    fn holds(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        self.reset();
        self.try_next(trie, env)
    }

    /// Value of `var` in the first solution.
    fn find(&mut self, trie: &Trie, env: &mut Bindings, var: &Variable) -> Result<Key> {
        self.reset();
        if self.try_next(trie, env)? {
            return env.value(var).cloned();
        }
        Err(KbError::NoSolution { query: self.name() })
    }

    /// Values of `var` across all solutions, in enumeration order, duplicates kept.
    fn find_all(&mut self, trie: &Trie, env: &mut Bindings, var: &Variable) -> Result<Vec<Key>> {
        let mut values = Vec::new();
        self.reset();
        while self.try_next(trie, env)? {
            values.push(env.value(var)?.clone());
        }
        Ok(values)
    }

    /// Values of `var` across all solutions, first occurrence of each only.
    fn find_all_unique(
        &mut self,
        trie: &Trie,
        env: &mut Bindings,
        var: &Variable,
    ) -> Result<Vec<Key>> {
        let mut values: Vec<Key> = Vec::new();
        self.reset();
        while self.try_next(trie, env)? {
            let value = env.value(var)?;
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    /// Run `action` once per solution, returning the number of solutions.
    ///
    /// The action runs after the current solution has been captured. It may
    /// assert into the trie or retract through other queries, but must not
    /// rebind the variables this query reads. An action error stops the
    /// enumeration.
    fn do_all(
        &mut self,
        trie: &mut Trie,
        env: &mut Bindings,
        action: &mut dyn FnMut(&mut Trie, &mut Bindings) -> Result<()>,
    ) -> Result<usize> {
        let mut count = 0;
        self.reset();
        while self.try_next(trie, env)? {
            action(trie, env)?;
            count += 1;
        }
        Ok(count)
    }

    /// Conjoin with another query.
    fn and<Q: Query>(self, other: Q) -> Conjunction<Self, Q>
    where
        Self: Sized,
    {
        Conjunction::new(self, other)
    }
}

impl<Q: Query + ?Sized> Query for Box<Q> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        (**self).try_next(trie, env)
    }

    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt_name(f)
    }
}

/// Display adapter for any query, including unsized ones.
pub struct QueryName<'a, Q: ?Sized>(pub &'a Q);

impl<Q: Query + ?Sized> fmt::Display for QueryName<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_name(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::loves_kb;

    #[test]
    fn test_holds() {
        let (trie, mut env) = loves_kb();

        let mut yes = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child("Mary")
            .build();
        let mut no = QueryBuilder::new(trie.root(), &mut env)
            .child("Kelly")
            .child("loves")
            .child("John")
            .build();

        assert!(yes.holds(&trie, &mut env).unwrap());
        assert!(!no.holds(&trie, &mut env).unwrap());
        // Repeatable.
        assert!(yes.holds(&trie, &mut env).unwrap());
    }

    #[test]
    fn test_find() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("loves")
            .child("Kelly")
            .build();
        assert_eq!(query.find(&trie, &mut env, &v), Ok(Key::symbol("John")));
        assert_eq!(
            query.find_all(&trie, &mut env, &v),
            Ok(vec![Key::symbol("John")])
        );
    }

    #[test]
    fn test_find_no_solution() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("hates")
            .build();
        let err = query.find(&trie, &mut env, &v).unwrap_err();
        assert_eq!(
            err,
            KbError::NoSolution {
                query: "v+hates".to_string()
            }
        );
    }

    #[test]
    fn test_find_all_keeps_duplicates() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");
        let w = env.variable("w");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("loves")
            .child(&w)
            .build();
        let beloved = query.find_all(&trie, &mut env, &w).unwrap();
        assert_eq!(
            beloved,
            vec![
                Key::symbol("Newt"),
                Key::symbol("Mary"),
                Key::symbol("Kelly"),
                Key::symbol("Mary"),
            ]
        );

        let unique = query.find_all_unique(&trie, &mut env, &w).unwrap();
        assert_eq!(
            unique,
            vec![Key::symbol("Newt"), Key::symbol("Mary"), Key::symbol("Kelly")]
        );
    }

    #[test]
    fn test_do_all_counts_solutions() {
        let (mut trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("loves")
            .child("Mary")
            .build();
        let mut seen = Vec::new();
        let count = query
            .do_all(&mut trie, &mut env, &mut |_, env| {
                seen.push(env.value(&v)?.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, vec![Key::symbol("John"), Key::symbol("Kelly")]);
    }

    #[test]
    fn test_do_all_stops_on_action_error() {
        let (mut trie, mut env) = loves_kb();
        let v = env.variable("v");
        let unbound = env.variable("unbound");

        let mut query = QueryBuilder::new(trie.root(), &mut env).child(&v).build();
        let result = query.do_all(&mut trie, &mut env, &mut |_, env| {
            env.value(&unbound).map(|_| ())
        });
        assert!(matches!(result, Err(KbError::UnboundVariable { .. })));
    }

    #[test]
    fn test_boxed_query_name() {
        let (trie, mut env) = loves_kb();
        let x = env.variable("x");

        let query: Box<dyn Query> = Box::new(
            QueryBuilder::new(trie.root(), &mut env)
                .child("John")
                .child("loves")
                .child(&x)
                .build(),
        );
        assert_eq!(query.name(), "John+loves+x");
    }
}
