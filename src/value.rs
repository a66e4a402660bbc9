//! Runtime values produced by matches and semantic actions.
//!
//! Terminal matchers produce [`Value::Token`]; sequences and repeats produce
//! [`Value::List`]; replacement functions may turn those into any other
//! variant. The model is deliberately small and serde-serialisable so hosts
//! can persist or transport match results directly.

use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value flowing out of the matching engine.
///
/// # Examples
///
/// ```rust
/// use vyaka::value::Value;
/// let n = Value::Number(3.14);
/// assert_eq!(n.type_name(), "Number");
/// let t = Value::token("abc", 7);
/// assert_eq!(t.text(), Some("abc"));
/// assert_eq!(t.pos(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Nil,
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// A terminal match: the consumed text and its byte position in the input.
    Token { text: String, pos: usize },
}

impl Value {
    /// Builds a token value; the engine uses this for every terminal match.
    pub fn token(text: impl Into<String>, pos: usize) -> Self {
        Value::Token {
            text: text.into(),
            pos,
        }
    }

    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Token { .. } => "Token",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The consumed text, for token values.
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Token { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The input byte position, for token values.
    pub fn pos(&self) -> Option<usize> {
        match self {
            Value::Token { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {}", entries[key])?;
                }
                write!(f, "}}")
            }
            Value::Token { text, pos } => write!(f, "{text:?}@{pos}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
