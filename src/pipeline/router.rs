//! Query routing.
//!
//! The router is a one-stage pipeline that classifies a question into a
//! closed set of pipeline names. It is purely classificatory: no tool, no
//! store access. Replies outside the enumeration degrade to [`RouteDecision::Unknown`]
//! instead of failing the query.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::llm::{prompt, LlmClient};
use crate::pipeline::stage::LlmStage;
use crate::pipeline::{Pipeline, PipelineContext};

/// Which pipeline should handle a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// SQL retrieval.
    Sql,
    /// Time-series forecasting.
    Forecast,
    /// No pipeline matched; terminal but not an error.
    Unknown,
}

impl RouteDecision {
    /// Maps a router reply value onto the closed enumeration.
    fn from_value(value: &Value) -> Self {
        match value.as_str().map(|s| s.trim().to_lowercase()).as_deref() {
            Some("sql") => Self::Sql,
            Some("forecast") => Self::Forecast,
            _ => Self::Unknown,
        }
    }
}

/// A routing decision plus the raw router output for diagnostics.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// The decision driving pipeline selection.
    pub decision: RouteDecision,
    /// The router's raw output, preserved for the unrecognized result.
    pub raw: Value,
}

/// Builds the router's single reasoning stage.
pub fn router_stage(llm: Arc<dyn LlmClient>) -> LlmStage {
    LlmStage::new(
        "router",
        prompt::ROUTER_INSTRUCTIONS,
        &["query"],
        &["response"],
        llm,
    )
}

/// Single-stage classification pipeline.
pub struct Router {
    pipeline: Pipeline,
}

impl Router {
    /// Creates a router over the given backend.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            pipeline: Pipeline::new("router", vec![Box::new(router_stage(llm))]),
        }
    }

    /// Classifies a query.
    ///
    /// A reply outside the enumeration, a missing `response` key, or an
    /// unparsable reply all degrade to `Unknown`; only backend transport
    /// failures propagate as errors.
    pub async fn route(&self, query: &str) -> Result<RouteOutcome> {
        let context = PipelineContext::with_query(query);

        match self.pipeline.run(context).await {
            Ok(output) => {
                let decision = output
                    .get("response")
                    .map(RouteDecision::from_value)
                    .unwrap_or(RouteDecision::Unknown);
                debug!(?decision, "router classified query");
                Ok(RouteOutcome {
                    decision,
                    raw: Value::Object(output),
                })
            }
            // The router's own contract violations are explicitly non-fatal.
            Err(ScoutError::Contract(message)) => {
                debug!(%message, "router reply outside contract");
                Ok(RouteOutcome {
                    decision: RouteDecision::Unknown,
                    raw: Value::String(message),
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn router_with_reply(reply: &str) -> Router {
        Router::new(Arc::new(
            MockLlmClient::new().with_response("Classify the question", reply),
        ))
    }

    #[tokio::test]
    async fn test_routes_sql() {
        let outcome = router_with_reply(r#"{"response": "sql"}"#)
            .route("Which park had most attendances in 2008?")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Sql);
    }

    #[tokio::test]
    async fn test_routes_forecast() {
        let outcome = router_with_reply(r#"{"response": "forecast"}"#)
            .route("Predict attendance for 2027")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Forecast);
    }

    #[tokio::test]
    async fn test_null_response_is_unknown() {
        let outcome = router_with_reply(r#"{"response": null}"#)
            .route("Hello there")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Unknown);
        assert!(outcome.raw.is_object());
    }

    #[tokio::test]
    async fn test_value_outside_enumeration_is_unknown() {
        let outcome = router_with_reply(r#"{"response": "chitchat"}"#)
            .route("Hello there")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Unknown);
    }

    #[tokio::test]
    async fn test_prose_reply_degrades_to_unknown() {
        let outcome = router_with_reply("I'm not sure what you mean.")
            .route("Hello there")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Unknown);
        // The raw reply is preserved for diagnostics.
        assert!(outcome.raw.as_str().unwrap().contains("router"));
    }

    #[tokio::test]
    async fn test_missing_response_key_degrades_to_unknown() {
        let outcome = router_with_reply(r#"{"route": "sql"}"#)
            .route("Which park?")
            .await
            .unwrap();
        assert_eq!(outcome.decision, RouteDecision::Unknown);
    }

    #[tokio::test]
    async fn test_decision_parse_ignores_case_and_whitespace() {
        assert_eq!(
            RouteDecision::from_value(&Value::from(" SQL ")),
            RouteDecision::Sql
        );
        assert_eq!(
            RouteDecision::from_value(&Value::from("Forecast")),
            RouteDecision::Forecast
        );
        assert_eq!(
            RouteDecision::from_value(&Value::from(42)),
            RouteDecision::Unknown
        );
    }
}
