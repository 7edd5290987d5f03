//! txscope main entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use txscope_api::start_server;
use txscope_client::HttpTransactionSource;
use txscope_config::{Config, ConfigError};
use txscope_core::{DraftStore, Explorer};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(name = "txscope")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight HTMX explorer for blockchain-style transaction records", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override api.base_url
    #[arg(long)]
    api_url: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_logging(level: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    env_logger::Builder::new().parse_filters(&filter).init();
}

/// A missing file at the default path means "run with defaults"
fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match Config::load(args.config.clone()) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { .. }) if args.config == PathBuf::from(DEFAULT_CONFIG_PATH) => {
            Config::default()
        }
        Err(e) => return Err(e),
    };
    if let Some(url) = &args.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging("error");
            let details = e.to_details();
            log::error!("Failed to load configuration: {}", details.message);
            for suggestion in &details.suggestions {
                log::error!("  hint: {}", suggestion);
            }
            std::process::exit(2);
        }
    };

    init_logging(&config.logging.level);
    log::info!(
        "Config loaded: api={}{}, drafts={}",
        config.api.base_url,
        config.api.path_prefix,
        config.drafts.path.display()
    );

    let source = Arc::new(HttpTransactionSource::new(&config.api)?);
    let drafts = Arc::new(DraftStore::new(config.drafts.path.clone(), config.drafts.key.clone()));
    let explorer = Explorer::new(source, config.explorer.clone(), Some(drafts));

    match explorer.fetch_all(false).await {
        Ok(()) => log::info!("Initial transaction list loaded"),
        Err(e) => log::error!("Initial load failed, the page will offer a retry: {}", e),
    }
    explorer.start_polling();

    start_server(config, explorer).await?;
    Ok(())
}
