//! Cardwatch CLI
//!
//! Watches gift card shop pages and posts newly listed cards to a Discord
//! channel. Credentials come from `DISCORD_TOKEN` and `CHANNEL_ID`, which may
//! be placed in a `.env` file.

use std::path::PathBuf;
use std::sync::Arc;

use cardwatch::{
    error::Result,
    models::{Config, Credentials},
    pipeline::{Checker, Notifier, Scheduler},
    services::{DiscordSender, HttpBrowser},
    storage::JsonFileStore,
};
use clap::Parser;

/// Cardwatch - Gift Card Stock Monitor
#[derive(Parser, Debug)]
#[command(
    name = "cardwatch",
    version,
    about = "Announces newly listed gift cards on Discord"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run a single check and exit instead of scheduling
    #[arg(long)]
    once: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env file loaded: {}", e);
    }

    log::info!("Cardwatch starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    let credentials = Credentials::from_env()?;

    log::info!(
        "Monitoring {} sources every {}s",
        config.sources.len(),
        config.schedule.interval_secs
    );

    let sender = DiscordSender::new(&config.notify.api_base, &credentials.token)?;
    sender.ready().await?;

    let notifier = Notifier::new(Arc::new(sender), &credentials.channel_id, &config.notify);
    let browser = HttpBrowser::new(&config.browser)?;
    let store = JsonFileStore::new(&config.paths.snapshot_file);
    let interval = config.schedule.interval();

    let checker = Checker::new(
        Arc::new(config),
        Arc::new(browser),
        Arc::new(store),
        notifier,
    )?;

    if cli.once {
        let report = checker.run_once().await?;
        log::info!(
            "Check finished: {}/{} sources succeeded, {} known cards",
            report.succeeded(),
            report.sources.len(),
            report.snapshot.card_count()
        );
        return Ok(());
    }

    let scheduler = Scheduler::new(Arc::new(checker), interval);
    let started = scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    log::info!("Stopped after {} checks", started);
    Ok(())
}
