//! Prompt construction for pipeline stages.
//!
//! Each stage carries a fixed instruction block; the stage's declared inputs
//! are serialized into the user message so the backend sees exactly the
//! contract the stage sees.

use crate::llm::types::Message;
use serde_json::{Map, Value};

/// Instructions for the router stage.
pub const ROUTER_INSTRUCTIONS: &str = r#"You route natural-language questions about a relational database.
Classify the question: does answering it require SQL retrieval from the
database, or a time-series forecast?

Respond with exactly one of:
{"response": "sql"}
{"response": "forecast"}
{"response": null}

Use null when neither applies."#;

/// Instructions for the fetch-relevant-tables stage.
pub const FETCH_TABLES_INSTRUCTIONS: &str = r#"You are given a question and the database schema under the "Database Schema" key.
Identify the tables needed to answer the question.

Respond with: {"relevant_tables": ["table1", "table2"]}"#;

/// Instructions for the fetch-relevant-columns stage.
pub const FETCH_COLUMNS_INSTRUCTIONS: &str = r#"You are given a question, the database schema under the "Database Schema" key,
and the relevant tables identified for it. Pick the columns needed from each
of those tables.

Respond with: {"relevant_columns": {"table1": ["column1"], "table2": ["column1", "column2"]}}"#;

/// Instructions for the generate-SQL stage.
pub const GENERATE_SQL_INSTRUCTIONS: &str = r#"Generate a single SQL statement answering the question, using only the
relevant tables and columns provided.

Respond with: {"sql": "SELECT ..."}"#;

/// Instructions for the forecasting stage.
pub const FORECAST_INSTRUCTIONS: &str = r#"Analyze the time-series intent of the question and produce a forecast value.

Respond with: {"predicted": value}"#;

/// Builds the message list for one stage invocation.
pub fn build_stage_messages(instructions: &str, inputs: &Map<String, Value>) -> Vec<Message> {
    let system = format!("{instructions}\n\nRespond with a single JSON object and nothing else.");
    let user = serde_json::to_string_pretty(&Value::Object(inputs.clone()))
        .unwrap_or_else(|_| "{}".to_string());

    vec![Message::system(system), Message::user(user)]
}
