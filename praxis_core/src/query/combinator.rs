//! Conjunction and predicate queries.

use std::fmt;

use super::Query;
use crate::error::Result;
use crate::trie::Trie;
use crate::variable::Bindings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinState {
    Reset,
    InProgress,
    Exhausted,
}

/// Nested-loop join of two queries.
///
/// For each solution of `left`, `right` is reset and enumerated. Variables
/// bound by `left` are visible to `right`, which is how clauses sharing a
/// variable join.
#[derive(Debug, Clone)]
pub struct Conjunction<L, R> {
    left: L,
    right: R,
    state: JoinState,
}

impl<L: Query, R: Query> Conjunction<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            state: JoinState::Reset,
        }
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }
}

impl<L: Query, R: Query> Query for Conjunction<L, R> {
    fn reset(&mut self) {
        // `right` is reset per outer solution.
        self.left.reset();
        self.state = JoinState::Reset;
    }

    fn try_next(&mut self, trie: &Trie, env: &mut Bindings) -> Result<bool> {
        match self.state {
            JoinState::Reset => {
                while self.left.try_next(trie, env)? {
                    self.right.reset();
                    if self.right.try_next(trie, env)? {
                        self.state = JoinState::InProgress;
                        return Ok(true);
                    }
                }
                self.state = JoinState::Exhausted;
                Ok(false)
            }
            JoinState::InProgress => {
                loop {
                    if self.right.try_next(trie, env)? {
                        return Ok(true);
                    }
                    self.right.reset();
                    if !self.left.try_next(trie, env)? {
                        break;
                    }
                }
                self.state = JoinState::Exhausted;
                Ok(false)
            }
            JoinState::Exhausted => Ok(false),
        }
    }

    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.left.fmt_name(f)?;
        f.write_str(" & ")?;
        self.right.fmt_name(f)
    }
}

impl<L: Query, R: Query> fmt::Display for Conjunction<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_name(f)
    }
}

type Test = Box<dyn Fn(&Bindings) -> Result<bool>>;

/// A query with one solution when its test passes and none otherwise.
///
/// The test runs once per pass, at the point the predicate is reached; it is
/// not a standing constraint.
pub struct Predicate {
    label: String,
    test: Test,
    done: bool,
}

impl Predicate {
    pub fn new(
        label: impl Into<String>,
        test: impl Fn(&Bindings) -> Result<bool> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            test: Box::new(test),
            done: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Query for Predicate {
    fn reset(&mut self) {
        self.done = false;
    }

    fn try_next(&mut self, _trie: &Trie, env: &mut Bindings) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        (self.test)(env)
    }

    fn fmt_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_name(f)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .field("done", &self.done)
            .finish()
    }
}
