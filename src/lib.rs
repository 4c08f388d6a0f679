//! sqlscout - natural-language query routing and SQL generation for
//! relational databases.
//!
//! A router classifies each question as SQL retrieval or forecasting, the
//! matching staged pipeline grounds it in the live schema and an execution
//! tool runs the generated SQL. This library exposes the core modules for
//! use in integration tests and embedding.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod pipeline;
