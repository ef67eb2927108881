//! Decoding of batched JSON payloads, either one payload at a time or by joining the whole
//! batch into a single JSON array and parsing once.  See [batch] for the two decode
//! strategies and [comparison] for the timing harness which pits them against each other.
use std::borrow::Cow;

pub mod batch;
pub mod comparison;
pub mod coords;
pub mod decoders;
pub mod errors;
pub mod lexer;
pub mod parser;
#[cfg(test)]
mod test_macros;

/// Basic enumeration of different Json values
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue<'a> {
    /// Map of values
    Object(Vec<(String, JsonValue<'a>)>),
    /// Array of values
    Array(Vec<JsonValue<'a>>),
    /// Canonical string value
    String(Cow<'a, str>),

    /// Floating point numeric value
    Float(f64),

    /// Integer numeric value
    Integer(i64),
    /// Canonical boolean value
    Boolean(bool),
    /// Canonical null value
    Null,
}

impl<'a> JsonValue<'a> {
    /// Look up the value of an object member by key.  Returns [None] for non-objects
    pub fn get(&self, key: &str) -> Option<&JsonValue<'a>> {
        match self {
            JsonValue::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}
