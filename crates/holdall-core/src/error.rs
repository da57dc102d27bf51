use serde_json::Value;
use thiserror::Error;

/// The single validated precondition in the core: stores hold object graphs.
///
/// Everything else (a selector that panics, an action that panics, indexing a
/// missing action) propagates to the caller untranslated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid initial state: expected an object, got {found}")]
    InvalidInitialState { found: &'static str },
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
