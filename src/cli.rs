use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "idxchart")]
#[command(about = "IDX stock chart dashboard client", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the IDX session status, refreshing every poll interval
    Clock {
        /// Print the current status once and exit
        #[arg(long)]
        once: bool,
    },
    /// Search symbols by code or company name
    Search { query: String },
    /// List every available symbol
    List,
    /// Fetch technical data and build chart series
    Analyze {
        symbol: String,
        #[arg(short, long)]
        interval: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Toggle the SMA 20/50 overlay relative to the config default
        #[arg(long)]
        sma: bool,
        /// Toggle the EMA 12/26 overlay relative to the config default
        #[arg(long)]
        ema: bool,
        /// Toggle the Bollinger Bands overlay relative to the config default
        #[arg(long)]
        bb: bool,
        /// Print the series as JSON for an external renderer
        #[arg(long)]
        json: bool,
    },
    /// Show company information
    Info { symbol: String },
    /// Show fundamental analysis
    Fundamental { symbol: String },
    /// Check backend health
    Health,
    /// Show or toggle the saved theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
}
