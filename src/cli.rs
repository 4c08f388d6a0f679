//! Command-line argument parsing.
//!
//! Connection parameters come from the environment; the command line carries
//! the question itself plus a few overrides.

use clap::Parser;
use std::path::PathBuf;

/// Ask natural-language questions against a relational database.
#[derive(Parser, Debug)]
#[command(name = "sqlscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The natural-language question to process
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Database kind override (sqlite or postgres)
    #[arg(long, value_name = "KIND", env = "DB_TYPE")]
    pub db_type: Option<String>,

    /// SQLite database file override
    #[arg(long, value_name = "PATH", env = "SQLITE_DB_PATH")]
    pub db_path: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// LLM provider override (openai or mock)
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<String>,

    /// Use the mock LLM backend (no API key required)
    #[arg(long)]
    pub mock_llm: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the effective LLM provider name, if overridden.
    pub fn llm_provider(&self) -> Option<&str> {
        if self.mock_llm {
            Some("mock")
        } else {
            self.llm.as_deref()
        }
    }
}
