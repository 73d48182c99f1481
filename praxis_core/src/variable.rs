//! Logic variables and the environment holding their bindings.
//!
//! A [`Variable`] is only a handle. Whether it has been used, and what it is
//! currently bound to, lives in the [`Bindings`] it was created from. The
//! first query step that references a variable claims it and captures values
//! into it; every later reference, in the same query or in another query
//! built against the same environment, filters on the bound value.

use std::rc::Rc;

use crate::error::{KbError, Result};
use crate::key::Key;
use crate::query::Predicate;

/// Index of a variable within its [`Bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

/// Handle to a logic variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    id: VarId,
    name: Rc<str>,
}

impl Variable {
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Name, for debugging and query rendering.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-shot test that both variables are bound to equal values.
    ///
    /// Fails with `InvalidVariableComparison` unless both variables have
    /// already been used by some query built against `env`.
    pub fn equal(&self, other: &Variable, env: &Bindings) -> Result<Predicate> {
        self.check_comparable("==", other, env)?;
        let (a, b) = (self.clone(), other.clone());
        Ok(Predicate::new(
            format!("{} == {}", self.name, other.name),
            move |env: &Bindings| Ok(env.value(&a)? == env.value(&b)?),
        ))
    }

    /// One-shot test that the variables are bound to different values.
    ///
    /// This compares values, not identity: `x.not_equal(&x)` is always false.
    pub fn not_equal(&self, other: &Variable, env: &Bindings) -> Result<Predicate> {
        self.check_comparable("!=", other, env)?;
        let (a, b) = (self.clone(), other.clone());
        Ok(Predicate::new(
            format!("{} != {}", self.name, other.name),
            move |env: &Bindings| Ok(env.value(&a)? != env.value(&b)?),
        ))
    }

    fn check_comparable(&self, op: &'static str, other: &Variable, env: &Bindings) -> Result<()> {
        if env.is_used(self) && env.is_used(other) {
            Ok(())
        } else {
            Err(KbError::InvalidVariableComparison {
                op,
                left: self.name.to_string(),
                right: other.name.to_string(),
            })
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
struct Binding {
    name: Rc<str>,
    used: bool,
    value: Option<Key>,
}

/// The binding environment shared by every query that mentions its variables.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    slots: Vec<Binding>,
}

impl Bindings {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, unused variable.
    pub fn variable(&mut self, name: impl Into<String>) -> Variable {
        let name: Rc<str> = Rc::from(name.into());
        let id = VarId(self.slots.len() as u32);
        self.slots.push(Binding {
            name: name.clone(),
            used: false,
            value: None,
        });
        Variable { id, name }
    }

    /// True once some query construction has referenced the variable.
    pub fn is_used(&self, var: &Variable) -> bool {
        self.slot(var).map(|b| b.used).unwrap_or(false)
    }

    /// Mark the variable used. Returns true if this was its first use, in
    /// which case the caller captures into it rather than filtering on it.
    pub fn claim(&mut self, var: &Variable) -> bool {
        match self.slot_mut(var) {
            Some(binding) if !binding.used => {
                binding.used = true;
                true
            }
            _ => false,
        }
    }

    /// Current value of the variable.
    pub fn value(&self, var: &Variable) -> Result<&Key> {
        self.slot(var)
            .and_then(|b| b.value.as_ref())
            .ok_or_else(|| KbError::UnboundVariable {
                name: var.name.to_string(),
            })
    }

    /// Bind the variable, marking it used.
    pub fn bind(&mut self, var: &Variable, key: Key) {
        if let Some(binding) = self.slot_mut(var) {
            binding.value = Some(key);
            binding.used = true;
        }
    }

    /// Name the variable was created with.
    pub fn name(&self, var: &Variable) -> Option<&str> {
        self.slot(var).map(|b| &*b.name)
    }

    /// Number of variables allocated in this environment.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, var: &Variable) -> Option<&Binding> {
        self.slots
            .get(var.id.0 as usize)
            .filter(|b| Rc::ptr_eq(&b.name, &var.name))
    }

    fn slot_mut(&mut self, var: &Variable) -> Option<&mut Binding> {
        self.slots
            .get_mut(var.id.0 as usize)
            .filter(|b| Rc::ptr_eq(&b.name, &var.name))
    }
}

/// One position of a fact path: a literal key or a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Key(Key),
    Var(Variable),
}

impl Term {
    /// The key this term stands for under the given bindings.
    pub fn resolve(&self, env: &Bindings) -> Result<Key> {
        match self {
            Term::Key(key) => Ok(key.clone()),
            Term::Var(var) => env.value(var).cloned(),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Key(key) => write!(f, "{}", key),
            Term::Var(var) => write!(f, "{}", var),
        }
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Var(var)
    }
}

impl From<&Variable> for Term {
    fn from(var: &Variable) -> Self {
        Term::Var(var.clone())
    }
}

impl From<Key> for Term {
    fn from(key: Key) -> Self {
        Term::Key(key)
    }
}

impl From<&Key> for Term {
    fn from(key: &Key) -> Self {
        Term::Key(key.clone())
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Key(s.into())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Key(s.into())
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Key(n.into())
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::Key(n.into())
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Key(b.into())
    }
}

impl From<uuid::Uuid> for Term {
    fn from(id: uuid::Uuid) -> Self {
        Term::Key(id.into())
    }
}
