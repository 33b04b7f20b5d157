//! Scheme data types produced by the reader.
//!
//! Atoms (numbers, booleans, characters, symbols, strings) evaluate to
//! themselves; composite structure is built from `Pair` cells terminated by
//! the unique empty list `Nil`. The reader builds these trees bottom-up and
//! never mutates them afterwards.
//!
//! A value is a *well-formed list* iff it is `Nil` or a pair whose second
//! element is, recursively, a well-formed list. That property is checked
//! where it matters (`is_list`, `list_len`) and tolerated where it does not
//! (display and iteration handle dotted tails).

mod number;
pub use number::Number;
pub(crate) use number::ratio_to_f64;

use std::fmt;
use std::rc::Rc;

/// A Scheme expression.
///
/// `Nil` is a variant rather than a sentinel object, so there is exactly one
/// empty list and no structurally-empty impostor can be constructed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(Number),
    Boolean(bool),
    Character(char),
    Symbol(String),
    String(String),
    Pair(Rc<Pair>),
    Nil,
}

/// A cons cell. Owns its `first`/`second` substructure.
#[derive(Debug, PartialEq)]
pub struct Pair {
    pub first: Value,
    pub second: Value,
}

impl Value {
    /// Construct a pair. No implicit list flattening.
    pub fn cons(first: Value, second: Value) -> Value {
        Value::Pair(Rc::new(Pair { first, second }))
    }

    /// Build a proper list from a host sequence, preserving element order.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, item| Value::cons(item, tail))
    }

    /// Whether this is a well-formed list. Assumes no cycles.
    pub fn is_list(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Value::Nil => return true,
                Value::Pair(p) => current = &p.second,
                _ => return false,
            }
        }
    }

    /// Number of elements, or `None` if this is not a well-formed list.
    pub fn list_len(&self) -> Option<usize> {
        let mut count = 0;
        let mut current = self;
        loop {
            match current {
                Value::Nil => return Some(count),
                Value::Pair(p) => {
                    count += 1;
                    current = &p.second;
                }
                _ => return None,
            }
        }
    }

    /// Iterate over list elements.
    ///
    /// For an improper list, the dangling tail is yielded as a final item.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { current: self }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            Value::Nil => None,
            Value::Pair(p) => {
                self.current = &p.second;
                Some(&p.first)
            }
            tail => {
                self.current = &Value::Nil;
                Some(tail)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(true) => write!(f, "#t"),
            Value::Boolean(false) => write!(f, "#f"),
            Value::Character(' ') => write!(f, "#\\space"),
            Value::Character('\n') => write!(f, "#\\newline"),
            Value::Character(c) => write!(f, "#\\{c}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::String(s) => write_escaped_string(f, s),
            Value::Nil => write!(f, "()"),
            Value::Pair(p) => {
                write!(f, "({}", p.first)?;
                let mut second = &p.second;
                while let Value::Pair(next) = second {
                    write!(f, " {}", next.first)?;
                    second = &next.second;
                }
                if !matches!(second, Value::Nil) {
                    write!(f, " . {second}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Write a string in its external form, re-escaping quotes and backslashes
/// so the output can be read back.
pub(crate) fn write_escaped_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '"' => write!(f, "\\\"")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}
