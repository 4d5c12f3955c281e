/// Main entry point for the dashboard client
mod cli;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use idxchart::{
    api::ApiClient,
    config::load_config_or_default,
    dashboard::{render_summary, series_json, session_banner, DashboardState, PreferenceStore},
    error::{DashboardError, Result},
    time::{to_wib, ClockTick, SessionClock},
    Config, StockSymbol,
};

use cli::{Cli, Commands, ThemeAction};

/// Application state
pub struct DashboardApp {
    config: Config,
    client: ApiClient,
    preferences: PreferenceStore,
    state: DashboardState,
}

impl DashboardApp {
    pub async fn new(config: Config) -> Result<Self> {
        let client = ApiClient::from_config(&config)?;
        let preferences = PreferenceStore::new(&config.preferences_path);
        let theme = preferences.load_theme().await;
        let state = DashboardState::new(&config, theme);

        info!("Dashboard ready, backend {}", client.base_url());

        Ok(DashboardApp {
            config,
            client,
            preferences,
            state,
        })
    }

    /// Print an API failure inline instead of aborting
    fn show_error(panel: &str, e: &DashboardError) {
        error!("{} failed: {} ({})", panel, e, e.error_code());
        if e.is_recoverable() {
            println!("⚠️  {}: {} (temporary, try again)", panel, e.user_message());
        } else {
            println!("❌ {}: {}", panel, e.user_message());
        }
    }

    fn print_symbols(symbols: &[StockSymbol]) {
        if symbols.is_empty() {
            println!("No stocks found");
            return;
        }
        for s in symbols {
            println!("  {:<8} {}", s.symbol, s.name.as_deref().unwrap_or(""));
        }
    }

    fn print_tick(tick: &ClockTick) {
        let icon = if tick.state.is_trading() { "🟢" } else { "🔴" };
        println!("{} {}", icon, session_banner(tick.state, tick.at));
        println!("   Next change at {} WIB", to_wib(tick.next_change).format("%a %H:%M"));
    }

    pub async fn clock(&self, once: bool) -> Result<()> {
        let period = Duration::from_secs(self.config.clock_poll_interval_sec);
        let mut clock = SessionClock::new(period);

        if once {
            Self::print_tick(&clock.observe(Utc::now()));
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(clock.run(tx));

        loop {
            tokio::select! {
                tick = rx.recv() => {
                    let Some(tick) = tick else { break };
                    if tick.changed {
                        Self::print_tick(&tick);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        drop(rx);
        if let Err(e) = handle.await {
            error!("Clock task ended abnormally: {}", e);
        }
        Ok(())
    }

    pub async fn search(&self, query: &str) {
        match self.client.search_stocks(query).await {
            Ok(results) => Self::print_symbols(&results),
            Err(e) => Self::show_error("Search", &e),
        }
    }

    pub async fn list(&self) {
        match self.client.all_stocks().await {
            Ok(stocks) => Self::print_symbols(&stocks),
            Err(e) => Self::show_error("Stock list", &e),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn analyze(
        &mut self,
        symbol: &str,
        interval: Option<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        toggle_sma: bool,
        toggle_ema: bool,
        toggle_bb: bool,
        as_json: bool,
    ) -> Result<()> {
        self.state.set_symbol(symbol);
        if let Some(interval) = interval {
            self.state.set_interval(&interval);
        }
        self.state.set_range(start, end);
        if toggle_sma {
            self.state.toggle_sma();
        }
        if toggle_ema {
            self.state.toggle_ema();
        }
        if toggle_bb {
            self.state.toggle_bollinger_bands();
        }

        let ticket = self.state.begin_analysis()?;
        let analysis = match self
            .client
            .technical_analysis(&ticket.symbol, &ticket.query)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                Self::show_error("Analysis", &e);
                return Ok(());
            }
        };

        let series = match self.state.apply_analysis(&ticket, analysis, Utc::now()) {
            Ok(series) => series.clone(),
            Err(e) => {
                warn!("{}", e);
                return Ok(());
            }
        };

        if as_json {
            println!("{}", series_json(&series)?);
        } else if let Some(analysis) = self.state.analysis() {
            print!("{}", render_summary(analysis, &series));
        }
        Ok(())
    }

    pub async fn info(&self, symbol: &str) -> Result<()> {
        match self.client.company_info(symbol).await {
            Ok(info) => println!("{}", serde_json::to_string_pretty(&info)?),
            Err(e) => Self::show_error("Company info", &e),
        }
        Ok(())
    }

    pub async fn fundamental(&self, symbol: &str) -> Result<()> {
        match self.client.fundamental_analysis(symbol).await {
            Ok(f) => {
                println!("📊 {}", f.symbol);
                println!("{}", serde_json::to_string_pretty(&f.analysis)?);
            }
            Err(e) => Self::show_error("Fundamental analysis", &e),
        }
        Ok(())
    }

    pub async fn health(&self) {
        match self.client.health().await {
            Ok(health) => {
                println!("Backend: {}", health.status);
                for (service, up) in &health.services {
                    println!("  {:<16} {}", service, if *up { "✓" } else { "✗" });
                }
            }
            Err(e) => Self::show_error("Health", &e),
        }
    }

    pub async fn theme(&mut self, action: ThemeAction) -> Result<()> {
        if action == ThemeAction::Toggle {
            let theme = self.state.toggle_theme();
            self.preferences.save_theme(theme).await?;
        }
        println!("Theme: {}", self.state.theme.as_str());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_found) = load_config_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if !config_found {
        warn!("Config file {} not found, using defaults", cli.config.display());
    }

    let mut app = DashboardApp::new(config).await?;

    match cli.command {
        Commands::Clock { once } => app.clock(once).await?,
        Commands::Search { query } => app.search(&query).await,
        Commands::List => app.list().await,
        Commands::Analyze {
            symbol,
            interval,
            start,
            end,
            sma,
            ema,
            bb,
            json,
        } => {
            app.analyze(&symbol, interval, start, end, sma, ema, bb, json)
                .await?
        }
        Commands::Info { symbol } => app.info(&symbol).await?,
        Commands::Fundamental { symbol } => app.fundamental(&symbol).await?,
        Commands::Health => app.health().await,
        Commands::Theme { action } => app.theme(action).await?,
    }

    Ok(())
}
