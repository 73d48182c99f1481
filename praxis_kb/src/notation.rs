//! Textual fact paths such as `John+mother-Betty`.
//!
//! `+` introduces a non-exclusive child and `-` an exclusive one. Segments
//! that are all decimal digits parse as integers, `true` and `false` as
//! booleans, and anything else as a symbol.

use std::fmt;
use std::str::FromStr;

use praxis_core::{Key, Link};

use crate::error::PathError;

/// A parsed fact path: a first key under the root, then linked steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    first: Key,
    steps: Vec<(Link, Key)>,
}

impl Path {
    pub fn new(first: impl Into<Key>) -> Self {
        Self {
            first: first.into(),
            steps: Vec::new(),
        }
    }

    pub fn child(mut self, key: impl Into<Key>) -> Self {
        self.steps.push((Link::NonExclusive, key.into()));
        self
    }

    pub fn exclusive(mut self, key: impl Into<Key>) -> Self {
        self.steps.push((Link::Exclusive, key.into()));
        self
    }

    pub fn first(&self) -> &Key {
        &self.first
    }

    pub fn steps(&self) -> &[(Link, Key)] {
        &self.steps
    }

    /// Number of keys, counting the first.
    pub fn len(&self) -> usize {
        self.steps.len() + 1
    }
}

fn parse_key(segment: &str) -> Key {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = segment.parse::<i64>() {
            return Key::Int(n);
        }
    }
    match segment {
        "true" => Key::Bool(true),
        "false" => Key::Bool(false),
        _ => Key::symbol(segment),
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PathError::Empty);
        }

        let empty = |position| PathError::EmptySegment {
            text: text.to_string(),
            position,
        };

        let mut segments = Vec::new();
        let mut link = None;
        let mut start = 0;
        for (i, c) in text.char_indices() {
            let next = match c {
                '+' => Link::NonExclusive,
                '-' => Link::Exclusive,
                _ => continue,
            };
            let segment = &text[start..i];
            if segment.is_empty() {
                return Err(empty(segments.len()));
            }
            segments.push((link, parse_key(segment)));
            link = Some(next);
            start = i + 1;
        }
        let last = &text[start..];
        if last.is_empty() {
            return Err(empty(segments.len()));
        }
        segments.push((link, parse_key(last)));

        let mut segments = segments.into_iter();
        let first = match segments.next() {
            Some((_, key)) => key,
            None => return Err(PathError::Empty),
        };
        let steps = segments
            .map(|(link, key)| (link.unwrap_or(Link::NonExclusive), key))
            .collect();
        Ok(Self { first, steps })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (link, key) in &self.steps {
            write!(f, "{}{}", link, key)?;
        }
        Ok(())
    }
}
