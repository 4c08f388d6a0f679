//! Shared pipeline context.

use serde_json::{Map, Value};

/// The accumulating mapping carried through one pipeline run.
///
/// Seeded by the orchestrator with the query and connection parameters, it
/// gains one key-set per completed stage and is discarded when the pipeline
/// returns. Owned by a single query; never shared between runs.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    values: Map<String, Value>,
}

impl PipelineContext {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context seeded with the raw query text.
    pub fn with_query(query: impl Into<String>) -> Self {
        let mut context = Self::new();
        context.insert("query", Value::from(query.into()));
        context
    }

    /// Inserts a single key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Merges a stage's output keys into the context.
    ///
    /// Later keys win, so a stage can refine an earlier stage's value.
    pub fn merge(&mut self, output: Map<String, Value>) {
        for (key, value) in output {
            self.values.insert(key, value);
        }
    }

    /// Returns the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the first of `keys` that is absent from the context.
    pub fn missing_key<'k>(&self, keys: &[&'k str]) -> Option<&'k str> {
        keys.iter().find(|key| !self.values.contains_key(**key)).copied()
    }

    /// Extracts the subset of the context under `keys`.
    ///
    /// Absent keys are skipped; callers check [`missing_key`] first.
    ///
    /// [`missing_key`]: Self::missing_key
    pub fn subset(&self, keys: &[&str]) -> Map<String, Value> {
        keys.iter()
            .filter_map(|key| {
                self.values
                    .get(*key)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_seeds_query_key() {
        let context = PipelineContext::with_query("Which park was busiest?");
        assert_eq!(context.get("query").unwrap(), "Which park was busiest?");
    }

    #[test]
    fn test_merge_adds_and_overwrites() {
        let mut context = PipelineContext::new();
        context.insert("a", Value::from(1));

        let mut output = Map::new();
        output.insert("a".to_string(), Value::from(2));
        output.insert("b".to_string(), Value::from(3));
        context.merge(output);

        assert_eq!(context.get("a").unwrap(), 2);
        assert_eq!(context.get("b").unwrap(), 3);
    }

    #[test]
    fn test_missing_key_reports_first_absent() {
        let mut context = PipelineContext::new();
        context.insert("present", Value::Null);

        assert_eq!(context.missing_key(&["present"]), None);
        assert_eq!(
            context.missing_key(&["present", "absent", "also_absent"]),
            Some("absent")
        );
    }

    #[test]
    fn test_null_value_counts_as_present() {
        let mut context = PipelineContext::new();
        context.insert("db_path", Value::Null);

        assert_eq!(context.missing_key(&["db_path"]), None);
        assert!(context.subset(&["db_path"]).contains_key("db_path"));
    }

    #[test]
    fn test_subset_extracts_declared_keys_only() {
        let mut context = PipelineContext::new();
        context.insert("a", Value::from(1));
        context.insert("b", Value::from(2));

        let subset = context.subset(&["a"]);

        assert_eq!(subset.len(), 1);
        assert_eq!(subset["a"], 1);
    }
}
