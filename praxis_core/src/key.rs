//! Key definitions - the atoms stored at each level of the fact trie.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single term of a fact path.
///
/// Keys are compared structurally: `Key::Int(1)` and `Key::Symbol("1")` are
/// different keys even though they render the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A named atom (e.g., "John", "loves").
    Symbol(String),

    /// An integer value.
    Int(i64),

    /// A truth value.
    Bool(bool),

    /// Reference to a game entity.
    Entity(Uuid),
}

impl Key {
    /// Create a new symbol key.
    pub fn symbol(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }

    /// Create a new entity key.
    pub fn entity(id: Uuid) -> Self {
        Key::Entity(id)
    }

    /// The symbol text, if this is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Key::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get the kind of this key.
    pub fn kind(&self) -> &'static str {
        match self {
            Key::Symbol(_) => "symbol",
            Key::Int(_) => "int",
            Key::Bool(_) => "bool",
            Key::Entity(_) => "entity",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Symbol(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{}", n),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Entity(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Symbol(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Symbol(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Symbol(s.clone())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<Uuid> for Key {
    fn from(id: Uuid) -> Self {
        Key::Entity(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_conversions() {
        assert_eq!(Key::from("John"), Key::symbol("John"));
        assert_eq!(Key::from(String::from("John")), Key::symbol("John"));
        assert_eq!(Key::from(3), Key::Int(3));
        assert_eq!(Key::from(true), Key::Bool(true));

        let id = Uuid::new_v4();
        assert_eq!(Key::from(id), Key::entity(id));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::symbol("Mary").to_string(), "Mary");
        assert_eq!(Key::Int(-4).to_string(), "-4");
        assert_eq!(Key::Bool(false).to_string(), "false");
        assert_eq!(Key::entity(Uuid::nil()).to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_key_equality_is_structural() {
        assert_ne!(Key::Int(1), Key::symbol("1"));
        assert_eq!(Key::Int(1).to_string(), Key::symbol("1").to_string());
    }

    #[test]
    fn test_key_kind() {
        assert_eq!(Key::symbol("a").kind(), "symbol");
        assert_eq!(Key::Int(0).kind(), "int");
        assert_eq!(Key::entity(Uuid::nil()).kind(), "entity");
        assert_eq!(Key::symbol("a").as_symbol(), Some("a"));
        assert_eq!(Key::Bool(true).as_symbol(), None);
    }
}
