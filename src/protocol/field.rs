//! Three-state decode of loosely typed envelope members.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A JSON member that may be missing, well typed, or of the wrong type
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Member missing or `null`
    Absent,
    /// Member present and of the expected type
    Present(T),
    /// Member present with an unexpected type; the raw value is kept
    Malformed(Value),
}

impl<T: DeserializeOwned> Field<T> {
    /// Decode member `key` of a JSON object
    pub fn member(object: &Map<String, Value>, key: &str) -> Self {
        match object.get(key) {
            None | Some(Value::Null) => Field::Absent,
            Some(raw) => Self::from_value(raw),
        }
    }

    /// Decode a single JSON value
    pub fn from_value(raw: &Value) -> Self {
        if raw.is_null() {
            return Field::Absent;
        }
        match serde_json::from_value(raw.clone()) {
            Ok(value) => Field::Present(value),
            Err(_) => Field::Malformed(raw.clone()),
        }
    }
}

impl<T> Field<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_present(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Field::Malformed(_))
    }
}

impl<T: Default> Field<T> {
    /// Well-typed value, or `T::default()` when absent or malformed
    pub fn or_default(self) -> T {
        self.into_present().unwrap_or_default()
    }
}
