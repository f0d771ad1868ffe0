//! OTC Auto-Trader: simulated binary-options trading engine.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the engine runtime and the dashboard, and waits for Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use otc_autotrader::config;
use otc_autotrader::dashboard::{self, routes::DashboardState};
use otc_autotrader::engine::random::StdRandom;
use otc_autotrader::engine::runtime::{EngineRuntime, Timing};
use otc_autotrader::engine::Engine;

const BANNER: &str = r#"
  ___ _____ ___     _       _       _____            _
 / _ \_   _/ __|   /_\ _  _| |_ ___|_   _| _ __ _ __| |___ _ _
| (_) || || (__   / _ \ || |  _/ _ \ | || '_/ _` / _` / -_) '_|
 \___/ |_| \___| /_/ \_\_,_|\__\___/ |_||_| \__,_\__,_\___|_|

  Simulated signals. Simulated trades. No real money.
"#;

const CONFIG_PATH_ENV: &str = "AUTOTRADER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        name = %cfg.engine.name,
        initial_balance = format!("${:.2}", cfg.engine.initial_balance),
        pairs = ?cfg.engine.pairs,
        seed = ?cfg.engine.seed,
        "OTC Auto-Trader starting up"
    );

    // -- Engine ------------------------------------------------------------

    let rng = StdRandom::new(cfg.engine.seed);
    let mut engine = Engine::new(&cfg, Box::new(rng)).context("Invalid engine configuration")?;
    if cfg.engine.auto_start {
        engine.set_auto_trading(true);
    }

    let (handle, engine_task) = EngineRuntime::spawn(engine, Timing::from(&cfg.engine));

    // -- Dashboard ---------------------------------------------------------

    let dashboard_task = if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(handle.clone()));
        Some(dashboard::spawn_dashboard(state, cfg.dashboard.port).await?)
    } else {
        warn!("Dashboard disabled; engine runs headless");
        None
    };

    info!("Engine running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received.");

    if let Some(task) = dashboard_task {
        task.abort();
    }
    handle.shutdown().await;
    let engine = engine_task.await.context("Engine task panicked")?;

    let snapshot = engine.ledger_snapshot();
    info!(
        balance = format!("${:.2}", snapshot.balance),
        pnl = format!("${:.2}", snapshot.total_profit),
        trades = snapshot.trades.len(),
        win_rate = format!("{:.1}%", snapshot.win_rate * 100.0),
        unresolved = snapshot.active_trades,
        "OTC Auto-Trader shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("otc_autotrader=info"));

    let json_logging = std::env::var("AUTOTRADER_LOG_JSON").is_ok();

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
