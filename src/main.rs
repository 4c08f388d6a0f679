//! sqlscout - natural-language query routing and SQL generation for
//! relational databases.

use sqlscout::cli::Cli;
use sqlscout::config::{DatabaseConfig, DatabaseKind, LlmConfig};
use sqlscout::error::{Result, ScoutError};
use sqlscout::llm::build_client;
use sqlscout::orchestrator::Orchestrator;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // An explicit env file must exist; the default ./.env is optional.
    match cli.env_file.as_deref() {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                ScoutError::config(format!("Failed to load env file '{}': {e}", path.display()))
            })?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let db = resolve_database(&cli)?;
    info!("Database: {}", db.display_string());

    let mut llm_config = LlmConfig::from_env();
    if let Some(provider) = cli.llm_provider() {
        llm_config.provider = provider.to_string();
    }
    let llm = build_client(&llm_config)?;
    info!("LLM provider: {}", llm_config.provider);

    let orchestrator = Orchestrator::new(llm);
    let response = orchestrator.process(&cli.question, &db).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .map_err(|e| ScoutError::internal(format!("Failed to serialize response: {e}")))?;

    println!("{rendered}");
    Ok(())
}

/// Resolves the database configuration from the environment plus CLI overrides.
fn resolve_database(cli: &Cli) -> Result<DatabaseConfig> {
    let mut db = DatabaseConfig::from_env()?;

    if let Some(kind) = cli.db_type.as_deref() {
        db.kind = DatabaseKind::parse(kind).ok_or_else(|| {
            ScoutError::config(format!(
                "Invalid DB_TYPE: '{kind}'. Valid options: ['sqlite', 'postgres']"
            ))
        })?;
    }
    if let Some(path) = cli.db_path.clone() {
        db.db_path = Some(path);
    }

    db.validate()?;
    Ok(db)
}
