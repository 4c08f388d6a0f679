//! Pipeline composition and execution.
//!
//! A pipeline is an ordered sequence of stages sharing one context. Ordering
//! is load-bearing: SQL generation depends semantically on the table and
//! column stages before it, so stages run strictly sequentially and the
//! first failure aborts the rest of the run.

pub mod context;
pub mod router;
pub mod stage;

pub use context::PipelineContext;
pub use router::{RouteDecision, RouteOutcome, Router};
pub use stage::{ExecuteSqlStage, LlmStage, Stage, StageIo};

use crate::db::SqlExecutionTool;
use crate::error::{Result, ScoutError};
use crate::llm::LlmClient;
use std::sync::Arc;
use tracing::debug;

/// An ordered, sequential composition of stages.
pub struct Pipeline {
    name: &'static str,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Creates a pipeline from a stage sequence.
    pub fn new(name: &'static str, stages: Vec<Box<dyn Stage>>) -> Self {
        Self { name, stages }
    }

    /// Returns the pipeline's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds the SQL pipeline:
    /// fetch-tables -> fetch-columns -> generate-SQL -> validate-and-execute.
    ///
    /// Only the final stage holds the execution tool.
    pub fn sql(llm: Arc<dyn LlmClient>, tool: SqlExecutionTool) -> Self {
        Self::new(
            "sql",
            vec![
                Box::new(stage::fetch_tables_stage(llm.clone())),
                Box::new(stage::fetch_columns_stage(llm.clone())),
                Box::new(stage::generate_sql_stage(llm)),
                Box::new(ExecuteSqlStage::new(tool)),
            ],
        )
    }

    /// Builds the single-stage forecast pipeline.
    pub fn forecast(llm: Arc<dyn LlmClient>) -> Self {
        Self::new("forecasting", vec![Box::new(stage::forecast_stage(llm))])
    }

    /// Runs the stages in declared order and returns the last stage's output.
    ///
    /// Before each stage, the declared input subset is extracted from the
    /// context; a missing required key is a contract violation, as is a
    /// declared output key absent from the stage's result. Outputs merge
    /// into the shared context so later stages can use any earlier key. No
    /// stage is re-invoked within a run.
    pub async fn run(&self, mut context: PipelineContext) -> Result<StageIo> {
        let mut last: Option<StageIo> = None;

        for stage in &self.stages {
            if let Some(key) = context.missing_key(stage.input_keys()) {
                return Err(ScoutError::contract(format!(
                    "stage '{}' requires input key '{}' absent from context",
                    stage.name(),
                    key
                )));
            }

            let inputs = context.subset(stage.input_keys());
            debug!(pipeline = self.name, stage = stage.name(), "running stage");
            let output = stage.run(&inputs).await?;

            for key in stage.output_keys() {
                if !output.contains_key(*key) {
                    return Err(ScoutError::contract(format!(
                        "stage '{}' omitted declared output key '{}'",
                        stage.name(),
                        key
                    )));
                }
            }

            context.merge(output.clone());
            last = Some(output);
        }

        last.ok_or_else(|| {
            ScoutError::internal(format!("pipeline '{}' has no stages", self.name))
        })
    }
}
