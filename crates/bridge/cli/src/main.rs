mod commands;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Result, anyhow};
use bridge_core::{
    BridgeConfig, BridgeStatusTracker, ReqwestRestClient, RestStatusApi, SqliteStorage,
    init_logging,
};
use clap::Parser;
use commands::{Command, execute_command};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

/// Retries of a status request answered with a transient error
const STATUS_API_MAX_RETRIES: usize = 3;

#[derive(Parser)]
#[command(
    version,
    about = "CLI client for ranking bridge quotes and tracking bridge transactions",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the data directory
    #[arg(short, long, default_value = "./.data")]
    data_dir: String,

    /// Path to a TOML config file overriding the default bridge config
    #[arg(short, long, default_value = "bridge.toml")]
    config: PathBuf,

    /// Tracing filter directives written to the log file
    #[arg(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn expand_path(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(stripped) => Ok(dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .join(stripped)),
        None => Ok(PathBuf::from(path)),
    }
}

/// Defaults, then the config file if present, then `BRIDGE_*` environment variables.
fn load_config(config_path: &Path) -> Result<BridgeConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(BridgeConfig::default()));
    if let Ok(path) = std::fs::canonicalize(config_path) {
        debug!("Loading config file {}", path.display());
        figment = figment.merge(Toml::file(path));
    }
    Ok(figment.merge(Env::prefixed("BRIDGE_")).extract()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = expand_path(&cli.data_dir)?;
    init_logging(&data_dir, None, cli.log_filter)?;

    let config = load_config(&cli.config)?;
    let storage = SqliteStorage::new(&data_dir)?;
    let status_api = RestStatusApi::new(
        config.status_api_base_url.clone(),
        Arc::new(ReqwestRestClient::new()?),
        STATUS_API_MAX_RETRIES,
    );
    let tracker = BridgeStatusTracker::new(Arc::new(storage), Arc::new(status_api));

    execute_command(cli.command, &tracker, &config).await
}
