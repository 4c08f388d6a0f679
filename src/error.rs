//! Error types for sqlscout.
//!
//! Defines the main error enum used throughout the crate.
//!
//! Two failure classes deliberately do NOT appear here: SQL statements that
//! fail at the store are absorbed into an [`ExecutionResult`] value by the
//! execution tool, and router replies outside the route enumeration degrade
//! to the `unknown` route instead of erroring.
//!
//! [`ExecutionResult`]: crate::db::ExecutionResult

use thiserror::Error;

/// Main error type for sqlscout operations.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Configuration errors (missing connection parameters, unsupported
    /// database kind, bad environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// LLM backend errors (rate limits, auth, timeouts, unparsable replies).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Stage contract violations (a declared output key is missing, or a
    /// required input key is absent from the pipeline context).
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Internal errors (unexpected states, bugs).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a contract violation with the given message.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Llm(_) => "LLM Error",
            Self::Contract(_) => "Contract Violation",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ScoutError.
pub type Result<T> = std::result::Result<T, ScoutError>;
