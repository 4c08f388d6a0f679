//! Result types for SQL execution.
//!
//! Rows are opaque tuples of driver values; nothing in the pipeline
//! interprets their contents.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// Represents a single value from a database row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to a display string.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// Values serialize as plain JSON scalars so execution results read naturally
// in the final response.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => {
                let mut seq = serializer.serialize_seq(Some(b.len()))?;
                for byte in b {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Outcome status of a SQL execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    Success,
    Error,
}

/// The result of running one SQL statement through the execution tool.
///
/// Every failure mode of the tool, including malformed input and store-side
/// errors, is reported through this value; the tool never raises past its
/// boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Whether the statement ran successfully.
    pub status: ExecStatus,

    /// Human-readable outcome description.
    pub message: String,

    /// Result rows for SELECT statements; null otherwise.
    pub data: Option<Vec<Row>>,
}

impl ExecutionResult {
    /// Creates a success result with the standard message.
    pub fn success(data: Option<Vec<Row>>) -> Self {
        Self {
            status: ExecStatus::Success,
            message: "Query executed successfully".to_string(),
            data,
        }
    }

    /// Creates an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Error,
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the statement ran successfully.
    pub fn is_success(&self) -> bool {
        self.status == ExecStatus::Success
    }

    /// Converts the result into a stage output mapping.
    pub fn to_stage_output(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // Serialization of this struct cannot fail or produce a non-object.
            _ => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_display_string(), "NULL");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::Int(42).to_display_string(), "42");
        assert_eq!(Value::Float(2.71).to_display_string(), "2.71");
        assert_eq!(
            Value::String("hello".to_string()).to_display_string(),
            "hello"
        );
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_display_string(), "<3 bytes>");
    }

    #[test]
    fn test_value_from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from(2.71f64), Value::Float(2.71));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
    }

    #[test]
    fn test_value_serializes_as_plain_json() {
        let row: Row = vec![Value::Int(1), Value::String("a".into()), Value::Null];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);
    }

    #[test]
    fn test_success_result_shape() {
        let result = ExecutionResult::success(Some(vec![vec![Value::Int(1)]]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Query executed successfully");
        assert_eq!(json["data"], serde_json::json!([[1]]));
    }

    #[test]
    fn test_error_result_has_null_data() {
        let result = ExecutionResult::error("Error executing query: boom");
        assert!(!result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_to_stage_output_keys() {
        let output = ExecutionResult::success(None).to_stage_output();
        assert!(output.contains_key("status"));
        assert!(output.contains_key("message"));
        assert!(output.contains_key("data"));
    }
}
