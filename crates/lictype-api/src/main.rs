//! lictype-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `LICTYPE_*` environment variables, opens the SQLite store, builds the
//! configured inference backend, and either serves the HTTP API or runs a
//! single classification pass.
//!
//! Nested keys use a double underscore, e.g.
//! `LICTYPE_INFERENCE__PROVIDER=openai`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lictype_api::{AppState, ServerConfig, pipeline};
use lictype_llm::Backend;
use lictype_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "License typology classification server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
  /// Serve the HTTP API (default).
  #[default]
  Serve,
  /// Run one ingest, classify and export pass, print the report and exit.
  Classify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("LICTYPE")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.input_path = expand_tilde(&server_cfg.input_path);
  server_cfg.output_path = expand_tilde(&server_cfg.output_path);

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let backend = Backend::from_config(&server_cfg.inference)
    .context("failed to build inference client")?;
  tracing::info!(backend = %backend.describe(), "inference backend ready");

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(Arc::new(store), Arc::new(backend), server_cfg);

  match cli.command.unwrap_or_default() {
    Command::Classify => {
      let report = pipeline::run_once(&state)
        .await
        .context("classification run failed")?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Command::Serve => {
      let app = lictype_api::router(state);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
