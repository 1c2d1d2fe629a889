//! Shared types for the confstore workspace.
//!
//! This crate holds the unified error type, the configuration map
//! alias, and the path-resolution constants used by the store.

use serde_json::Value;
use thiserror::Error;

/// Environment variable consulted when no explicit path is given.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Fallback file name, resolved against the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Top-level shape of the backing document: an ordered mapping from
/// string keys to arbitrary JSON values.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Unified error type for the store.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A typed getter found the key, but the stored value has a
    /// different kind. Distinct from the key being absent.
    #[error("type mismatch for key {key:?}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Human-readable kind name of a JSON value, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_kind_names() {
        assert_eq!(value_kind(&json!(null)), "null");
        assert_eq!(value_kind(&json!(true)), "boolean");
        assert_eq!(value_kind(&json!(42)), "number");
        assert_eq!(value_kind(&json!("hi")), "string");
        assert_eq!(value_kind(&json!([1, 2])), "array");
        assert_eq!(value_kind(&json!({"a": 1})), "object");
    }

    #[test]
    fn type_mismatch_display() {
        let err = Error::TypeMismatch {
            key: "count".to_string(),
            expected: "string",
            found: "number",
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for key \"count\": expected string, found number"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
