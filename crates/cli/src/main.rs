mod kill_tui;
mod odds_client;
mod watchlist;

use algo_trade_core::traits::{FairValueProvider, PendingOrderSource, PositionSource};
use algo_trade_core::ConfigLoader;
use algo_trade_engine::{DevigFairValueProvider, EngineLoop, KillSwitch, PerSportFairValueProvider, TickOutcome};
use algo_trade_kalshi::{
    KalshiAuth, KalshiAuthConfig, KalshiClientConfig, KalshiExecutor, KalshiExecutorConfig, KalshiWsClient,
    KalshiWsConfig,
};
use algo_trade_market::{OrderBookCache, StalenessTracker};
use algo_trade_position::{PendingOrderRegistry, PositionTracker};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "algo-trade")]
#[command(about = "Sports-arbitrage trading engine for Kalshi prediction markets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the engine loop against the configured sport and watchlist.
    Run {
        /// Sport identifier this process trades (e.g. NBA, NFL).
        #[arg(long)]
        sport: String,

        /// Path to a JSON file listing the matchups to evaluate each tick.
        #[arg(long)]
        watchlist: PathBuf,

        /// Use Kalshi's demo environment instead of production.
        #[arg(long)]
        demo: bool,

        /// Run headless, without the F12 kill-switch TUI.
        #[arg(long)]
        headless: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { sport, watchlist, demo, headless } => run_engine(&sport, &watchlist, demo, headless).await,
    }
}

async fn run_engine(sport: &str, watchlist_path: &PathBuf, demo: bool, headless: bool) -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    let matchups = watchlist::load(watchlist_path)?;
    tracing::info!(sport, matchups = matchups.len(), dry_run = config.dry_run, "loaded configuration");

    let auth_config = if demo { KalshiAuthConfig::demo() } else { KalshiAuthConfig::default() };
    let client_config = if demo { KalshiClientConfig::demo() } else { KalshiClientConfig::production() }
        .with_auth_config(auth_config.clone());

    let executor = KalshiExecutor::new(KalshiExecutorConfig::default().with_client_config(client_config))?;

    let ws_auth = KalshiAuth::from_env(auth_config)?;
    let orderbook = Arc::new(Mutex::new(OrderBookCache::new()));
    let staleness = Arc::new(StalenessTracker::new());
    // Populated on the first market poll; the stream reconnects as the
    // watched ticker set changes rather than needing it up front.
    let tickers: Vec<String> = Vec::new();
    let ws_client = KalshiWsClient::new(ws_auth, KalshiWsConfig::default());
    let ws_cache = Arc::clone(&orderbook);
    let ws_staleness = Arc::clone(&staleness);
    tokio::spawn(async move {
        if let Err(e) = ws_client.run(tickers, ws_cache, ws_staleness).await {
            tracing::error!(error = %e, "orderbook websocket task exited");
        }
    });

    let positions = Arc::new(PositionTracker::new());
    let registry = Arc::new(PendingOrderRegistry::new());

    let odds_api_key = std::env::var("ODDS_API_KEY").unwrap_or_default();
    let odds_source = odds_client::TheOddsApiSource::new(odds_api_key);
    let fair_value: Arc<dyn FairValueProvider> =
        Arc::new(PerSportFairValueProvider::new(Arc::new(DevigFairValueProvider::new(odds_source, 0.15))));

    let (kill_tx, kill_switch) = KillSwitch::channel(4);

    let mut engine = EngineLoop::new(
        executor,
        orderbook,
        staleness,
        sport.to_string(),
        matchups,
        Arc::clone(&positions),
        Arc::clone(&registry),
        fair_value,
        config,
        kill_switch,
    );

    if headless {
        run_tick_loop(&mut engine).await
    } else {
        let positions_view: Arc<dyn PositionSource> = positions;
        let registry_view: Arc<dyn PendingOrderSource> = registry;
        let tui = tokio::spawn(kill_tui::run(positions_view, registry_view, kill_tx));
        let loop_result = run_tick_loop(&mut engine).await;
        tui.await.ok();
        loop_result
    }
}

async fn run_tick_loop(engine: &mut EngineLoop) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        interval.tick().await;
        match engine.tick(chrono::Utc::now()).await? {
            TickOutcome::Continued => {}
            TickOutcome::Killed => {
                tracing::info!("engine loop stopped after kill switch");
                return Ok(());
            }
        }
    }
}
