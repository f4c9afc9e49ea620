use anyhow::Context;
use clap::Parser;
use plexboxd::app::App;
use plexboxd::cli::Args;
use plexboxd::config::Config;
use plexboxd::logging::setup_logging;
use plexboxd::store::{FileStore, KvStore, Settings};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let (config, store) = match bootstrap().await {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Debug mode is a stored setting, so the store has to be open before logging starts
    let debug_mode = Settings::new(store.clone())
        .debug_mode()
        .await
        .unwrap_or(false);
    setup_logging(&config, args.tracing, debug_mode);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        store = %config.store_path.display(),
        debug_mode,
        "starting plexboxd"
    );

    let app = match App::new(&config, store) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    app.run(args.command).await
}

async fn bootstrap() -> Result<(Config, Arc<dyn KvStore>), anyhow::Error> {
    let config = Config::load().context("Failed to load config")?;
    let store = FileStore::open(config.store_path.clone())
        .await
        .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?;
    Ok((config, Arc::new(store)))
}
