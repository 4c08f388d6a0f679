//! Pipeline stages.
//!
//! A stage is a declared input/output contract bound to an opaque call:
//! either a reasoning request to the LLM backend, or (for exactly one stage)
//! the SQL execution tool. Stages are composed, never subclassed, and hold
//! at most one tool.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::db::{SqlExecutionTool, SqlRequest, SCHEMA_KEY};
use crate::error::{Result, ScoutError};
use crate::llm::{parser, prompt, LlmClient};

/// A stage's input or output mapping.
pub type StageIo = Map<String, Value>;

/// One unit of pipeline work.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's name, used in contract-violation messages.
    fn name(&self) -> &'static str;

    /// Keys the stage requires from the pipeline context.
    fn input_keys(&self) -> &'static [&'static str];

    /// Keys the stage guarantees to produce.
    fn output_keys(&self) -> &'static [&'static str];

    /// Runs the stage on its declared input subset.
    async fn run(&self, inputs: &StageIo) -> Result<StageIo>;
}

/// A reasoning stage backed by the LLM.
///
/// Builds a prompt from its instructions and declared inputs, asks the
/// backend once, and parses the JSON object reply. An unparsable reply is a
/// contract violation (the stage promised a JSON object), not an LLM
/// transport error.
pub struct LlmStage {
    name: &'static str,
    instructions: &'static str,
    input_keys: &'static [&'static str],
    output_keys: &'static [&'static str],
    llm: Arc<dyn LlmClient>,
}

impl LlmStage {
    /// Creates a reasoning stage with the given contract.
    pub fn new(
        name: &'static str,
        instructions: &'static str,
        input_keys: &'static [&'static str],
        output_keys: &'static [&'static str],
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            name,
            instructions,
            input_keys,
            output_keys,
            llm,
        }
    }
}

#[async_trait]
impl Stage for LlmStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn input_keys(&self) -> &'static [&'static str] {
        self.input_keys
    }

    fn output_keys(&self) -> &'static [&'static str] {
        self.output_keys
    }

    async fn run(&self, inputs: &StageIo) -> Result<StageIo> {
        let messages = prompt::build_stage_messages(self.instructions, inputs);
        let reply = self.llm.complete(&messages).await?;

        parser::extract_json_object(&reply).map_err(|_| {
            ScoutError::contract(format!(
                "stage '{}' reply was not a JSON object: {}",
                self.name,
                reply.trim()
            ))
        })
    }
}

/// The validate-and-execute stage, the only stage holding a tool.
///
/// Pulls the generated statement and connection parameters from its inputs
/// and hands them to the execution tool. Tool failures come back as a
/// normal `status: error` output, never as a stage error.
pub struct ExecuteSqlStage {
    tool: SqlExecutionTool,
}

impl ExecuteSqlStage {
    /// Creates the execution stage around a tool.
    pub fn new(tool: SqlExecutionTool) -> Self {
        Self { tool }
    }

    fn required_str<'a>(&self, inputs: &'a StageIo, key: &str) -> Result<&'a str> {
        inputs.get(key).and_then(Value::as_str).ok_or_else(|| {
            ScoutError::contract(format!(
                "stage '{}' requires string input '{}'",
                self.name(),
                key
            ))
        })
    }
}

#[async_trait]
impl Stage for ExecuteSqlStage {
    fn name(&self) -> &'static str {
        "validate_sql"
    }

    fn input_keys(&self) -> &'static [&'static str] {
        &["sql", "db_type", "db_path", "conn_string"]
    }

    fn output_keys(&self) -> &'static [&'static str] {
        &["status", "message", "data"]
    }

    async fn run(&self, inputs: &StageIo) -> Result<StageIo> {
        let request = SqlRequest {
            sql: self.required_str(inputs, "sql")?.to_string(),
            db_type: self.required_str(inputs, "db_type")?.to_string(),
            db_path: inputs
                .get("db_path")
                .and_then(Value::as_str)
                .map(String::from),
            conn_string: inputs
                .get("conn_string")
                .and_then(Value::as_str)
                .map(String::from),
        };

        let result = self.tool.execute(&request).await;
        Ok(result.to_stage_output())
    }
}

/// Builds the fetch-relevant-tables stage.
pub fn fetch_tables_stage(llm: Arc<dyn LlmClient>) -> LlmStage {
    LlmStage::new(
        "fetch_tables",
        prompt::FETCH_TABLES_INSTRUCTIONS,
        &["query", SCHEMA_KEY],
        &["relevant_tables"],
        llm,
    )
}

/// Builds the fetch-relevant-columns stage.
pub fn fetch_columns_stage(llm: Arc<dyn LlmClient>) -> LlmStage {
    LlmStage::new(
        "fetch_columns",
        prompt::FETCH_COLUMNS_INSTRUCTIONS,
        &["query", SCHEMA_KEY, "relevant_tables"],
        &["relevant_columns"],
        llm,
    )
}

/// Builds the generate-SQL stage.
pub fn generate_sql_stage(llm: Arc<dyn LlmClient>) -> LlmStage {
    LlmStage::new(
        "generate_sql",
        prompt::GENERATE_SQL_INSTRUCTIONS,
        &["query", "relevant_tables", "relevant_columns"],
        &["sql"],
        llm,
    )
}

/// Builds the forecasting stage.
pub fn forecast_stage(llm: Arc<dyn LlmClient>) -> LlmStage {
    LlmStage::new(
        "forecasting",
        prompt::FORECAST_INSTRUCTIONS,
        &["query"],
        &["predicted"],
        llm,
    )
}
