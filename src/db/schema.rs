//! Database schema representation.
//!
//! A schema is a table -> columns mapping, fetched once per query session and
//! immutable for the duration of a pipeline run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Context key under which the schema is exposed to pipeline stages.
pub const SCHEMA_KEY: &str = "Database Schema";

/// Normalized table -> ordered column names mapping.
///
/// Column order reflects the store's native catalog order; table iteration
/// order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    tables: BTreeMap<String, Vec<String>>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table with its columns.
    pub fn insert_table(&mut self, name: impl Into<String>, columns: Vec<String>) {
        self.tables.insert(name.into(), columns);
    }

    /// Returns the columns of a table, if present.
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates over (table, columns) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.tables.iter()
    }

    /// Formats the schema for inclusion in an LLM prompt.
    pub fn format_for_llm(&self) -> String {
        if self.tables.is_empty() {
            return "The database has no tables.".to_string();
        }

        self.tables
            .iter()
            .map(|(table, columns)| format!("Table: {}\n  Columns: {}\n", table, columns.join(", ")))
            .collect::<Vec<_>>()
            .join("")
    }

    /// Returns the `{"Database Schema": {table: [columns...]}}` wrapped
    /// mapping consumed by schema-aware stages.
    pub fn grounding(&self) -> serde_json::Value {
        serde_json::json!({ SCHEMA_KEY: self.tables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        let mut schema = Schema::new();
        schema.insert_table("t1", vec!["col_a".to_string(), "col_b".to_string()]);
        schema.insert_table("t2", vec!["col_x".to_string()]);
        schema
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::new();
        assert!(schema.is_empty());
        assert_eq!(schema.len(), 0);
        assert_eq!(schema.format_for_llm(), "The database has no tables.");
    }

    #[test]
    fn test_columns_preserve_order() {
        let schema = sample();
        assert_eq!(
            schema.columns("t1").unwrap(),
            &["col_a".to_string(), "col_b".to_string()]
        );
        assert!(schema.columns("missing").is_none());
    }

    #[test]
    fn test_format_for_llm_lists_tables() {
        let text = sample().format_for_llm();
        assert!(text.contains("Table: t1"));
        assert!(text.contains("col_a, col_b"));
        assert!(text.contains("Table: t2"));
    }

    #[test]
    fn test_grounding_wraps_schema_key() {
        let grounding = sample().grounding();
        let wrapped = &grounding[SCHEMA_KEY];
        assert_eq!(wrapped["t1"], serde_json::json!(["col_a", "col_b"]));
        assert_eq!(wrapped["t2"], serde_json::json!(["col_x"]));
    }

    #[test]
    fn test_schema_serializes_transparently() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["t2"], serde_json::json!(["col_x"]));
    }
}
