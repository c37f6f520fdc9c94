//! FlipFlop Oracle - token price snapshot fetcher
//!
//! Refreshes USD prices for the tracked token universe and publishes a
//! snapshot for the card-game backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use flipflop_oracle::adapters::cli::{CliApp, Command, RefreshCmd, ResolveCmd};
use flipflop_oracle::adapters::dexscreener::{DexscreenerClient, DexscreenerConfig};
use flipflop_oracle::adapters::fetch::RetryPolicy;
use flipflop_oracle::adapters::gecko::{GeckoClient, GeckoConfig};
use flipflop_oracle::adapters::store::FileSnapshotStore;
use flipflop_oracle::application::PriceOrchestrator;
use flipflop_oracle::config::{load_config, Config};
use flipflop_oracle::domain::load_universe;
use flipflop_oracle::ports::quote_source::QuoteSource;
use flipflop_oracle::ports::snapshot_store::SnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config_path = match &app.command {
        Command::Refresh(cmd) => &cmd.config,
        Command::Show(cmd) => &cmd.config,
        Command::Resolve(cmd) => &cmd.config,
    };
    let config = load_config(config_path).context("Failed to load configuration")?;

    init_logging(logging_filter(app.verbose, app.debug, &config.logging.level));

    match app.command {
        Command::Refresh(cmd) => refresh_command(cmd, &config).await,
        Command::Show(_) => show_command(&config).await,
        Command::Resolve(cmd) => resolve_command(cmd, &config).await,
    }
}

/// CLI flags take precedence over the configured level; an unparsable
/// configured level degrades to warn.
fn logging_filter(verbose: bool, debug: bool, config_level: &str) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn init_logging(filter: EnvFilter) {
    fmt().with_env_filter(filter).init();
}

fn build_sources(config: &Config) -> Result<Vec<Arc<dyn QuoteSource>>> {
    let dexscreener = DexscreenerClient::with_config(DexscreenerConfig {
        api_url: config.dexscreener.api_url.clone(),
        timeout: Duration::from_secs(config.dexscreener.timeout_secs),
        ..DexscreenerConfig::default()
    })
    .context("Failed to create DexScreener client")?;

    let mut sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(dexscreener)];

    if config.gecko.enabled {
        let gecko = GeckoClient::with_config(GeckoConfig {
            api_url: config.gecko.api_url.clone(),
            ..GeckoConfig::default()
        })
        .context("Failed to create GeckoTerminal client")?;
        sources.push(Arc::new(gecko));
    }

    Ok(sources)
}

fn build_store(config: &Config) -> Arc<FileSnapshotStore> {
    let path = shellexpand::tilde(&config.store.path).to_string();
    Arc::new(FileSnapshotStore::new(path))
}

async fn refresh_command(cmd: RefreshCmd, config: &Config) -> Result<()> {
    let token_list = shellexpand::tilde(&config.tokens.token_list).to_string();
    let mut universe = load_universe(&token_list)
        .with_context(|| format!("Failed to load token list from {}", token_list))?;
    for token in &mut universe {
        token.network = config.tokens.network.clone();
    }

    let sources = build_sources(config)?;
    let store = build_store(config);

    let orchestrator = PriceOrchestrator::new(universe, sources, store.clone())
        .with_snapshot_key(&config.store.snapshot_key)
        .with_pacing(
            Duration::from_millis(config.oracle.request_delay_ms),
            RetryPolicy::fixed(
                config.oracle.max_retries,
                Duration::from_millis(config.oracle.retry_delay_ms),
            ),
        );

    let prices = orchestrator.fetch_all_prices().await;

    if prices.is_empty() {
        bail!("no prices fetched, keeping previous snapshot");
    }

    if cmd.dry_run {
        println!("{}", serde_json::to_string_pretty(&prices)?);
        return Ok(());
    }

    store
        .set(&config.store.snapshot_key, serde_json::to_value(&prices)?)
        .await
        .context("Failed to publish snapshot")?;

    println!(
        "Published {} prices under '{}'",
        prices.len(),
        config.store.snapshot_key
    );
    Ok(())
}

async fn show_command(config: &Config) -> Result<()> {
    let store = build_store(config);

    match store.get(&config.store.snapshot_key).await? {
        Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        None => println!("No snapshot published under '{}'", config.store.snapshot_key),
    }
    Ok(())
}

async fn resolve_command(cmd: ResolveCmd, config: &Config) -> Result<()> {
    let client = DexscreenerClient::with_config(DexscreenerConfig {
        api_url: config.dexscreener.api_url.clone(),
        timeout: Duration::from_secs(config.dexscreener.timeout_secs),
        ..DexscreenerConfig::default()
    })
    .context("Failed to create DexScreener client")?;

    match client.resolve_token(&cmd.network, &cmd.token).await {
        Some(pair) => {
            println!("{} resolves to pair {}", cmd.token, pair);
            println!("https://dexscreener.com/{}/{}", cmd.network, pair);
        }
        None => bail!("no pair found for {} on {}", cmd.token, cmd.network),
    }
    Ok(())
}
