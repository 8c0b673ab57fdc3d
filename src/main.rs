//! Odds comparator command line.
//!
//! Entry point. Loads configuration, initialises structured logging, opens
//! the catalog database and runs one subcommand: the odds update batch job,
//! the dashboard server, or the demo data loader.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use odds_comparator::config::AppConfig;
use odds_comparator::dashboard::{self, routes::DashboardState};
use odds_comparator::engine::OddsUpdater;
use odds_comparator::seed;
use odds_comparator::storage::{OddsStore, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "odds-comparator", version, about = "Compare and simulate bookmaker odds")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed odds for new events and move existing odds
    UpdateOdds {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Lookahead window in days (defaults to engine.lookahead_days)
        #[arg(long, allow_negative_numbers = true)]
        days: Option<i64>,
    },
    /// Serve the comparison dashboard
    Serve {
        /// Port to listen on (defaults to dashboard.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load demo bookmakers, sports, bet types, events and odds
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load_or_default(&cli.config)?;

    init_logging(&cfg);

    let url = cfg.database_url();
    let store = SqliteStore::connect(&url)
        .await
        .with_context(|| format!("Failed to open database: {url}"))?;

    let outcome = run(cli.command, &cfg, &store).await;
    store.close().await;
    outcome
}

async fn run(command: Command, cfg: &AppConfig, store: &SqliteStore) -> Result<()> {
    match command {
        Command::UpdateOdds { dry_run, days } => {
            let days = days.unwrap_or(cfg.engine.lookahead_days);
            update_odds(store, days, dry_run).await
        }
        Command::Serve { port } => {
            if !cfg.dashboard.enabled {
                info!("Dashboard disabled in configuration");
                return Ok(());
            }
            let port = port.unwrap_or(cfg.dashboard.port);
            dashboard::serve(Arc::new(DashboardState::new(store.clone())), port).await
        }
        Command::Seed => {
            println!("Loading demo data...");
            let summary = seed::seed_demo(store)
                .await
                .context("Demo seeding failed")?;
            println!("{summary}");
            println!("Demo data ready: {} odds in total", store.count_odds().await?);
            Ok(())
        }
    }
}

async fn update_odds(store: &SqliteStore, days: i64, dry_run: bool) -> Result<()> {
    println!("Updating odds for events in the next {days} days...");
    if dry_run {
        println!("DRY RUN: no changes will be saved");
    }

    let engine_store: Arc<dyn OddsStore> = Arc::new(store.clone());
    let mut updater = OddsUpdater::new(engine_store);
    let report = updater
        .run(days, dry_run)
        .await
        .context("Odds update failed")?;

    if report.events_considered == 0 {
        println!("No active events found to update");
    }
    for update in &report.updates {
        println!("{update}");
    }
    println!("{}", report.summary_line());
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging(cfg: &AppConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));

    let json_logging = cfg.logging.json || std::env::var("ODDS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
