//! Stateless helper tools the assistant backend can call.
//!
//! Each tool takes a JSON object of arguments and returns an envelope, either
//! `{"success": true, ...fields}` or `{"success": false, "error": "..."}`.

pub mod clipboard;
pub mod datetime;
pub mod system;
pub mod text;
pub mod utility;

use serde_json::{json, Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("arguments must be a JSON object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("{0}")]
    Failed(String),
}

pub type ToolResult = Result<Map<String, Value>, ToolError>;

/// Wrap a tool outcome in the success/error envelope.
pub fn envelope(result: ToolResult) -> Value {
    match result {
        Ok(mut fields) => {
            fields.insert("success".to_string(), Value::Bool(true));
            Value::Object(fields)
        }
        Err(e) => {
            tracing::debug!(error = %e, "tool call failed");
            json!({ "success": false, "error": e.to_string() })
        }
    }
}

/// Turn a `json!({...})` literal into response fields.
pub(crate) fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Typed view over a tool's argument object.
pub struct Args<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    pub fn new(value: &'a Value) -> Result<Self, ToolError> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(ToolError::NotAnObject)
    }

    fn present(&self, field: &'static str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    pub fn str(&self, field: &'static str) -> Result<&'a str, ToolError> {
        self.opt_str(field)?.ok_or(ToolError::MissingField(field))
    }

    pub fn opt_str(&self, field: &'static str) -> Result<Option<&'a str>, ToolError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ToolError::InvalidField {
                field,
                expected: "must be a string",
            }),
        }
    }

    pub fn f64(&self, field: &'static str) -> Result<f64, ToolError> {
        self.opt_f64(field)?.ok_or(ToolError::MissingField(field))
    }

    pub fn opt_f64(&self, field: &'static str) -> Result<Option<f64>, ToolError> {
        match self.present(field) {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or(ToolError::InvalidField {
                field,
                expected: "must be a number",
            }),
        }
    }

    pub fn i64(&self, field: &'static str) -> Result<i64, ToolError> {
        self.opt_i64(field)?.ok_or(ToolError::MissingField(field))
    }

    pub fn opt_i64(&self, field: &'static str) -> Result<Option<i64>, ToolError> {
        match self.present(field) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or(ToolError::InvalidField {
                field,
                expected: "must be an integer",
            }),
        }
    }

    pub fn opt_bool(&self, field: &'static str) -> Result<Option<bool>, ToolError> {
        match self.present(field) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or(ToolError::InvalidField {
                field,
                expected: "must be a boolean",
            }),
        }
    }
}
