//! Primitive queries - chains of steps that each yield a trie node.

use std::fmt;

use tracing::trace;

use super::Query;
use crate::error::{KbError, Result};
use crate::key::Key;
use crate::trie::{Link, NodeId, Trie};
use crate::variable::{Bindings, Variable};

/// A query whose solutions are trie nodes, and which can therefore be
/// retracted.
#[derive(Debug, Clone)]
pub enum PrimitiveQuery {
    /// Yields one fixed node. Starts every chain.
    Singleton(Singleton),

    /// The child with a literal key under each parent solution.
    Constant(Constant),

    /// Every child under each parent solution, binding a fresh variable.
    Capture(Capture),

    /// The child matching an already bound variable under each parent solution.
    Filter(Filter),
}

#[derive(Debug, Clone)]
pub struct Singleton {
    node: NodeId,
    done: bool,
}

#[derive(Debug, Clone)]
pub struct Constant {
    parent: Box<PrimitiveQuery>,
    link: Link,
    key: Key,
    current: Option<NodeId>,
    done: bool,
}

#[derive(Debug, Clone)]
pub struct Capture {
    parent: Box<PrimitiveQuery>,
    link: Link,
    var: Variable,
    /// Position of `current` in the parent solution's children; `None`
    /// before the parent has produced a solution for this pass.
    index: Option<usize>,
    current: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Filter {
    parent: Box<PrimitiveQuery>,
    link: Link,
    var: Variable,
    current: Option<NodeId>,
    done: bool,
}

impl PrimitiveQuery {
    /// A query with `node` as its only solution.
    pub fn singleton(node: NodeId) -> Self {
        PrimitiveQuery::Singleton(Singleton { node, done: false })
    }

    pub fn constant(parent: PrimitiveQuery, link: Link, key: Key) -> Self {
        PrimitiveQuery::Constant(Constant {
            parent: Box::new(parent),
            link,
            key,
            current: None,
            done: false,
        })
    }

    pub fn capture(parent: PrimitiveQuery, link: Link, var: Variable) -> Self {
        PrimitiveQuery::Capture(Capture {
            parent: Box::new(parent),
            link,
            var,
            index: None,
            current: None,
        })
    }

    pub fn filter(parent: PrimitiveQuery, link: Link, var: Variable) -> Self {
        PrimitiveQuery::Filter(Filter {
            parent: Box::new(parent),
            link,
            var,
            current: None,
            done: false,
        })
    }

    /// The node produced by the most recent successful `try_next`.
    pub fn current(&self) -> Option<NodeId> {
        match self {
            PrimitiveQuery::Singleton(q) => Some(q.node),
            PrimitiveQuery::Constant(q) => q.current,
            PrimitiveQuery::Capture(q) => q.current,
            PrimitiveQuery::Filter(q) => q.current,
        }
    }

    /// The query this step extends; `None` for a singleton.
    pub fn parent(&self) -> Option<&PrimitiveQuery> {
        match self {
            PrimitiveQuery::Singleton(_) => None,
            PrimitiveQuery::Constant(q) => Some(&*q.parent),
            PrimitiveQuery::Capture(q) => Some(&*q.parent),
            PrimitiveQuery::Filter(q) => Some(&*q.parent),
        }
    }

    /// Remove the node of the first solution, with everything below it.
    ///
    /// Returns whether anything was removed. Sibling facts are untouched, and
    /// the parent node keeps its exclusion mode even if left childless.
    pub fn delete_first(&mut self, trie: &mut Trie, env: &mut Bindings) -> Result<bool> {
        self.ensure_retractable()?;
        self.reset();
        if !self.try_next(trie, env)? {
            return Ok(false);
        }
        Ok(self.remove_current(trie))
    }

    /// Remove every solution's node, returning how many entries went.
    ///
    /// A capture step in final position is a wildcard: every child of each
    /// parent solution is cleared in one step.
    pub fn delete_all(&mut self, trie: &mut Trie, env: &mut Bindings) -> Result<usize> {
        self.ensure_retractable()?;
        let mut removed = 0;
        self.reset();
        while self.try_next(trie, env)? {
            match self {
                PrimitiveQuery::Capture(q) => {
                    if let Some(parent) = q.parent.current() {
                        removed += trie.clear_children(parent);
                    }
                    // Nothing left under this parent; move on to the next one.
                    q.index = None;
                }
                _ => {
                    if self.remove_current(trie) {
                        removed += 1;
                    }
                }
            }
        }
        trace!(query = %self, removed, "retracted all");
        Ok(removed)
    }

    fn ensure_retractable(&self) -> Result<()> {
        match self {
            PrimitiveQuery::Singleton(_) => Err(KbError::NotRetractable {
                query: self.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn remove_current(&self, trie: &mut Trie) -> bool {
        match (self.parent().and_then(PrimitiveQuery::current), self.current()) {
            (Some(parent), Some(child)) => trie.remove_child(parent, child),
            _ => false,
        }
    }
}

impl Query for PrimitiveQuery {
    fn reset(&mut self) {
        match self {
            PrimitiveQuery::Singleton(q) => q.done = false,
            PrimitiveQuery::Constant(q) => {
                q.parent.reset();
                q.current = None;
                q.done = false;
            }
            PrimitiveQuery::Capture(q) => {
                q.parent.reset();
                q.current = None;
                q.index = None;
            }
            PrimitiveQuery::Filter(q) => {
                q.parent.reset();
                q.current = None;
                q.done = false;
            }
        }
    }

    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        match self {
            PrimitiveQuery::Singleton(q) => {
                if q.done {
                    return Ok(false);
                }
                q.done = true;
                Ok(true)
            }
            PrimitiveQuery::Constant(q) => q.try_next(trie, env),
            PrimitiveQuery::Capture(q) => q.try_next(trie, env),
            PrimitiveQuery::Filter(q) => q.try_next(trie, env),
        }
    }

    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveQuery::Singleton(_) => f.write_str("<singleton query>"),
            PrimitiveQuery::Constant(q) => {
                write_prefix(&q.parent, q.link, f)?;
                write!(f, "{}", q.key)
            }
            PrimitiveQuery::Capture(q) => {
                write_prefix(&q.parent, q.link, f)?;
                write!(f, "{}", q.var)
            }
            PrimitiveQuery::Filter(q) => {
                write_prefix(&q.parent, q.link, f)?;
                write!(f, "{}", q.var)
            }
        }
    }
}

impl fmt::Display for PrimitiveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_name(f)
    }
}

/// The chain leading up to a step; the root singleton is left implicit.
fn write_prefix(parent: &PrimitiveQuery, link: Link, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if matches!(parent, PrimitiveQuery::Singleton(_)) {
        return Ok(());
    }
    parent.fmt_name(f)?;
    write!(f, "{}", link)
}

impl Constant {
    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        // Non-exclusive stores hold one child per distinct key, so the first
        // match is the only one under this parent solution.
        while self.parent.try_next(trie, env)? {
            let Some(parent) = self.parent.current() else {
                continue;
            };
            if let Some(child) = trie.find_child(parent, &self.key) {
                self.current = Some(child);
                return Ok(true);
            }
        }
        self.done = true;
        Ok(false)
    }
}

impl Filter {
    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        while self.parent.try_next(trie, env)? {
            let Some(parent) = self.parent.current() else {
                continue;
            };
            // Re-read every time: the parent chain may have rebound it.
            let wanted = env.value(&self.var)?;
            if let Some(child) = trie.find_child(parent, wanted) {
                self.current = Some(child);
                return Ok(true);
            }
        }
        self.done = true;
        Ok(false)
    }
}

impl Capture {
    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        let mut index = match self.index {
            Some(index) => index + 1,
            None => {
                if !self.parent.try_next(trie, env)? {
                    return Ok(false);
                }
                0
            }
        };

        loop {
            let children = self
                .parent
                .current()
                .map(|parent| trie.children(parent))
                .unwrap_or(&[]);
            if let Some(&child) = children.get(index) {
                self.index = Some(index);
                self.current = Some(child);
                if let Some(key) = trie.key(child) {
                    env.bind(&self.var, key.clone());
                }
                return Ok(true);
            }

            // This parent solution's children are exhausted.
            index = 0;
            if !self.parent.try_next(trie, env)? {
                self.index = None;
                self.current = None;
                return Ok(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;
    use crate::testing::loves_kb;
    use crate::trie::ExclusionMode;

    fn holds(trie: &Trie, env: &mut Bindings, keys: &[&str]) -> bool {
        let mut builder = QueryBuilder::new(trie.root(), env);
        for key in keys {
            builder = builder.child(*key);
        }
        builder.build().holds(trie, env).unwrap()
    }

    #[test]
    fn test_singleton_yields_once() {
        let trie = Trie::new();
        let mut env = Bindings::new();
        let mut query = PrimitiveQuery::singleton(trie.root());

        query.reset();
        assert!(query.try_next(&trie, &mut env).unwrap());
        assert!(!query.try_next(&trie, &mut env).unwrap());
        assert_eq!(query.current(), Some(trie.root()));
        assert_eq!(query.to_string(), "<singleton query>");
    }

    #[test]
    fn test_capture_enumerates_in_order() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child(&v)
            .build();
        assert!(matches!(query, PrimitiveQuery::Capture(_)));
        assert_eq!(
            query.find_all(&trie, &mut env, &v).unwrap(),
            vec![Key::symbol("Mary"), Key::symbol("Kelly")]
        );
    }

    #[test]
    fn test_capture_spans_parent_solutions() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("loves")
            .child("Mary")
            .build();
        assert_eq!(
            query.find_all(&trie, &mut env, &v).unwrap(),
            vec![Key::symbol("John"), Key::symbol("Kelly")]
        );
    }

    #[test]
    fn test_capture_stays_exhausted() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env).child(&v).build();
        query.reset();
        let mut count = 0;
        while query.try_next(&trie, &mut env).unwrap() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(!query.try_next(&trie, &mut env).unwrap());
    }

    #[test]
    fn test_repeated_variable_filters() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&v)
            .child("loves")
            .child(&v)
            .build();
        assert!(matches!(query, PrimitiveQuery::Filter(_)));
        assert_eq!(
            query.find_all(&trie, &mut env, &v).unwrap(),
            vec![Key::symbol("Newt")]
        );
    }

    #[test]
    fn test_filter_on_unbound_variable_fails() {
        let (trie, mut env) = loves_kb();
        let v = env.variable("v");
        env.claim(&v);

        let mut query = QueryBuilder::new(trie.root(), &mut env).child(&v).build();
        assert!(matches!(
            query.holds(&trie, &mut env),
            Err(KbError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn test_query_name() {
        let (trie, mut env) = loves_kb();
        let x = env.variable("x");

        let query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child(&x)
            .build();
        assert_eq!(query.to_string(), "John+loves+x");

        let query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("mother")
            .exclusive(&x)
            .build();
        assert_eq!(query.to_string(), "John+mother-x");
    }

    #[test]
    fn test_delete_first_constant() {
        let (mut trie, mut env) = loves_kb();

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child("Mary")
            .build();
        assert!(query.delete_first(&mut trie, &mut env).unwrap());
        assert!(!holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Kelly"]));
        assert!(!query.delete_first(&mut trie, &mut env).unwrap());
    }

    #[test]
    fn test_delete_first_removes_subtree() {
        let (mut trie, mut env) = loves_kb();

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .build();
        query.delete_first(&mut trie, &mut env).unwrap();
        assert!(!holds(&trie, &mut env, &["John", "loves"]));
        assert!(holds(&trie, &mut env, &["John"]));
    }

    #[test]
    fn test_delete_first_capture_removes_one() {
        let (mut trie, mut env) = loves_kb();
        let x = env.variable("x");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child(&x)
            .build();
        assert!(query.delete_first(&mut trie, &mut env).unwrap());
        assert!(!holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Kelly"]));
    }

    #[test]
    fn test_delete_first_filter_removes_one() {
        let (mut trie, mut env) = loves_kb();
        trie.store(&env)
            .child("Mary")
            .and_then(|s| s.child("loves"))
            .and_then(|s| s.child("Mary"))
            .unwrap();
        let x = env.variable("x");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&x)
            .child("loves")
            .child(&x)
            .build();
        assert!(matches!(query, PrimitiveQuery::Filter(_)));
        assert!(query.delete_first(&mut trie, &mut env).unwrap());

        // Subjects are visited in assertion order, so Newt goes first.
        assert!(!holds(&trie, &mut env, &["Newt", "loves", "Newt"]));
        assert!(holds(&trie, &mut env, &["Mary", "loves", "Mary"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert_eq!(query.find_all(&trie, &mut env, &x).unwrap(), vec![Key::symbol("Mary")]);
    }

    #[test]
    fn test_delete_all_trailing_wildcard() {
        let (mut trie, mut env) = loves_kb();
        let x = env.variable("x");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("John")
            .child("loves")
            .child(&x)
            .build();
        assert_eq!(query.delete_all(&mut trie, &mut env).unwrap(), 2);
        assert!(!holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert!(!holds(&trie, &mut env, &["John", "loves", "Kelly"]));
        assert!(holds(&trie, &mut env, &["John", "loves"]));
        assert!(holds(&trie, &mut env, &["Kelly", "loves", "Mary"]));
    }

    #[test]
    fn test_delete_all_leading_wildcard() {
        let (mut trie, mut env) = loves_kb();
        let x = env.variable("x");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&x)
            .child("loves")
            .child("Mary")
            .build();
        assert_eq!(query.delete_all(&mut trie, &mut env).unwrap(), 2);
        assert!(!holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert!(!holds(&trie, &mut env, &["Kelly", "loves", "Mary"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Kelly"]));
        assert!(holds(&trie, &mut env, &["Kelly", "loves"]));
    }

    #[test]
    fn test_delete_all_reflexive_pattern() {
        let (mut trie, mut env) = loves_kb();
        let x = env.variable("x");

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child(&x)
            .child("loves")
            .child(&x)
            .build();
        assert_eq!(query.delete_all(&mut trie, &mut env).unwrap(), 1);
        assert!(!holds(&trie, &mut env, &["Newt", "loves", "Newt"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Mary"]));
        assert!(holds(&trie, &mut env, &["John", "loves", "Kelly"]));
        assert!(holds(&trie, &mut env, &["Kelly", "loves", "Mary"]));
    }

    #[test]
    fn test_delete_keeps_parent_mode() {
        let (mut trie, mut env) = loves_kb();

        let mut query = QueryBuilder::new(trie.root(), &mut env)
            .child("Newt")
            .child("loves")
            .child("Newt")
            .build();
        query.delete_first(&mut trie, &mut env).unwrap();

        let newt = trie.find_child(trie.root(), &Key::symbol("Newt")).unwrap();
        let loves = trie.find_child(newt, &Key::symbol("loves")).unwrap();
        assert!(trie.children(loves).is_empty());
        assert_eq!(trie.mode(loves), ExclusionMode::NonExclusive);
    }

    #[test]
    fn test_singleton_is_not_retractable() {
        let (mut trie, mut env) = loves_kb();
        let mut query = PrimitiveQuery::singleton(trie.root());

        assert!(matches!(
            query.delete_first(&mut trie, &mut env),
            Err(KbError::NotRetractable { .. })
        ));
        assert!(matches!(
            query.delete_all(&mut trie, &mut env),
            Err(KbError::NotRetractable { .. })
        ));
        assert!(!trie.is_empty());
    }
}
