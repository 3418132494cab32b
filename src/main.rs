//! Thin CLI glue over the Stockroom data substrate.
//! Issues single requests and moves backup documents in and out.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use stockroom::api::Method;
use stockroom::infra::app_config::{self, StorageMode};
use stockroom::state::AppState;

#[derive(Parser)]
#[command(name = "stockroom", version, about = "Local-first inventory data substrate")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a single REST-shaped request against the store.
    Request {
        /// GET, POST, PUT, or DELETE
        method: String,
        /// Relative or absolute URL, e.g. '/inventory?search=pen'
        url: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
    /// Write a full backup document to stdout.
    Export,
    /// Load a backup document from a file.
    Import {
        path: PathBuf,
        /// Clear all collections before loading instead of merging.
        #[arg(long)]
        replace: bool,
    },
    /// Show or change the persisted configuration.
    Config {
        /// Storage mode: local or remote
        #[arg(long)]
        mode: Option<String>,
        /// Base URL for an injected remote transport
        #[arg(long)]
        api_base_url: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Request { method, url, body } => {
            let state = AppState::new();
            let method = Method::from_str(&method)?;
            let body = body
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("request body is not valid JSON")?;

            let response = stockroom::block_on(state.backend.dispatch(method, &url, body.as_ref()));
            println!("{}", serde_json::to_string_pretty(response.json())?);
            if !response.ok {
                std::process::exit(1);
            }
        }
        Command::Export => {
            let state = AppState::new();
            let document = state.db.backup().export_all()?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Import { path, replace } => {
            let state = AppState::new();
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            state.db.backup().import_json(&raw, replace)?;
            log::info!("import complete (replace: {replace})");
        }
        Command::Config { mode, api_base_url } => {
            let mut config = app_config::load_config();
            if let Some(mode) = mode {
                config.mode = match mode.to_ascii_lowercase().as_str() {
                    "local" => StorageMode::Local,
                    "remote" => StorageMode::Remote,
                    other => anyhow::bail!("unknown storage mode: {other}"),
                };
            }
            if let Some(url) = api_base_url {
                config.api_base_url = Some(url);
            }
            app_config::save_config(&config).context("failed to write config")?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
