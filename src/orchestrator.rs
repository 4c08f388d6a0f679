//! Query orchestration.
//!
//! The orchestrator owns the router, both pipelines and the schema provider.
//! `process` is the crate's top-level entrypoint: classify the question,
//! seed the matching pipeline's context, run it and normalize the output
//! into a serializable response.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::db::{SchemaProvider, SqlExecutionTool};
use crate::error::Result;
use crate::llm::LlmClient;
use crate::pipeline::{Pipeline, PipelineContext, RouteDecision, Router, StageIo};

/// The normalized outcome of one processed query.
///
/// Serializes untagged so each variant reads as the plain JSON object a
/// caller would print: the SQL pipeline's execution result, the forecast
/// value, or the unrecognized-query envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// Output of the SQL pipeline's final execution stage.
    Sql(StageIo),
    /// Output of the forecast pipeline.
    Forecast {
        /// The predicted value for the requested horizon.
        predicted: Value,
    },
    /// The router could not map the question onto a pipeline.
    Unrecognized {
        /// Fixed human-readable marker.
        error: String,
        /// The router's raw output, for diagnostics.
        result: Value,
    },
}

/// Routes questions and drives the matching pipeline end to end.
pub struct Orchestrator {
    router: Router,
    sql_pipeline: Pipeline,
    forecast_pipeline: Pipeline,
    schema_provider: SchemaProvider,
}

impl Orchestrator {
    /// Wires the router and both pipelines over one shared LLM backend.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            router: Router::new(llm.clone()),
            sql_pipeline: Pipeline::sql(llm.clone(), SqlExecutionTool::new()),
            forecast_pipeline: Pipeline::forecast(llm),
            schema_provider: SchemaProvider::new(),
        }
    }

    /// Processes one natural-language question against the configured store.
    ///
    /// Routing failures outside the transport degrade to the unrecognized
    /// response; pipeline contract violations and connection failures
    /// propagate as errors.
    pub async fn process(&self, query: &str, db: &DatabaseConfig) -> Result<QueryResponse> {
        db.validate()?;

        let outcome = self.router.route(query).await?;
        info!(decision = ?outcome.decision, "query routed");

        match outcome.decision {
            RouteDecision::Sql => self.run_sql(query, db).await,
            RouteDecision::Forecast => self.run_forecast(query).await,
            RouteDecision::Unknown => {
                warn!("query type not recognized");
                Ok(QueryResponse::Unrecognized {
                    error: "Query type not recognized".to_string(),
                    result: outcome.raw,
                })
            }
        }
    }

    /// Runs the SQL pipeline with schema grounding and connection parameters.
    async fn run_sql(&self, query: &str, db: &DatabaseConfig) -> Result<QueryResponse> {
        // The schema is fetched fresh per query so a mutated store is
        // re-introspected on the next question.
        let schema = self.schema_provider.fetch(db).await?;
        info!(tables = schema.len(), "schema grounding loaded");

        let mut context = PipelineContext::with_query(query);
        context.merge(db.stage_inputs()?);
        if let Value::Object(grounding) = schema.grounding() {
            context.merge(grounding);
        }

        let output = self.sql_pipeline.run(context).await?;
        Ok(QueryResponse::Sql(output))
    }

    /// Runs the forecast pipeline from the question alone.
    async fn run_forecast(&self, query: &str) -> Result<QueryResponse> {
        let output = self.forecast_pipeline.run(PipelineContext::with_query(query)).await?;
        // The output contract guarantees the key is present.
        let predicted = output.get("predicted").cloned().unwrap_or(Value::Null);
        Ok(QueryResponse::Forecast { predicted })
    }
}
