/// Explicit dashboard state
///
/// Holds what the UI used to keep on a global app object: the selected
/// symbol, range, overlay toggles and theme. Analysis requests are numbered so
/// a response that resolves after a newer request was issued is dropped.
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::api::DataQuery;
use crate::chart::{build_series_with, BuildOptions};
use crate::error::{DashboardError, Result};
use crate::types::{ChartSeriesSet, Config, OverlayToggleSet, TechnicalAnalysis, Theme};

/// Handle for one in-flight analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub symbol: String,
    pub query: DataQuery,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub symbol: Option<String>,
    pub interval: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub overlays: OverlayToggleSet,
    pub theme: Theme,
    /// Builder settings from config; `now` is refreshed on every rebuild
    build_options: BuildOptions,
    generation: u64,
    analysis: Option<TechnicalAnalysis>,
    series: Option<ChartSeriesSet>,
}

impl DashboardState {
    pub fn new(config: &Config, theme: Theme) -> Self {
        DashboardState {
            symbol: None,
            interval: config.default_interval.clone(),
            start_date: None,
            end_date: None,
            overlays: config.overlays,
            theme,
            build_options: BuildOptions::from_config(config, Utc::now()),
            generation: 0,
            analysis: None,
            series: None,
        }
    }

    pub fn set_symbol(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        self.symbol = (!symbol.is_empty()).then_some(symbol);
    }

    pub fn set_interval(&mut self, interval: &str) {
        self.interval = interval.to_string();
    }

    pub fn set_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.start_date = start;
        self.end_date = end;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn toggle_sma(&mut self) {
        self.overlays.sma = !self.overlays.sma;
        self.rebuild_series(Utc::now());
    }

    pub fn toggle_ema(&mut self) {
        self.overlays.ema = !self.overlays.ema;
        self.rebuild_series(Utc::now());
    }

    pub fn toggle_bollinger_bands(&mut self) {
        self.overlays.bollinger_bands = !self.overlays.bollinger_bands;
        self.rebuild_series(Utc::now());
    }

    pub fn query(&self) -> DataQuery {
        DataQuery {
            interval: Some(self.interval.clone()),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Start a new analysis request; any older ticket becomes stale
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket> {
        let symbol = self
            .symbol
            .clone()
            .ok_or_else(|| DashboardError::InvalidParameter("no symbol selected".to_string()))?;

        self.generation += 1;
        debug!("Analysis #{} started for {}", self.generation, symbol);

        Ok(AnalysisTicket {
            generation: self.generation,
            symbol,
            query: self.query(),
        })
    }

    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store a resolved response and rebuild the chart series from it.
    /// Responses for superseded tickets are rejected and leave state untouched.
    pub fn apply_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        analysis: TechnicalAnalysis,
        now: DateTime<Utc>,
    ) -> Result<&ChartSeriesSet> {
        if !self.is_current(ticket) {
            debug!(
                "Dropping analysis #{} for {}, current is #{}",
                ticket.generation, ticket.symbol, self.generation
            );
            return Err(DashboardError::StaleResponse(format!(
                "analysis #{} for {}",
                ticket.generation, ticket.symbol
            )));
        }

        info!("Analysis #{} for {}: {} rows", ticket.generation, analysis.symbol, analysis.data.len());
        self.analysis = Some(analysis);
        self.rebuild_series(now);

        self.series
            .as_ref()
            .ok_or_else(|| DashboardError::MissingData("chart series".to_string()))
    }

    pub fn analysis(&self) -> Option<&TechnicalAnalysis> {
        self.analysis.as_ref()
    }

    pub fn series(&self) -> Option<&ChartSeriesSet> {
        self.series.as_ref()
    }

    fn rebuild_series(&mut self, now: DateTime<Utc>) {
        if let Some(analysis) = &self.analysis {
            let options = BuildOptions {
                now,
                ..self.build_options
            };
            self.series = Some(build_series_with(&analysis.data, self.overlays, &options));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Indicator, MissingTimestamp, TechnicalSummary, TimePoint};

    fn analysis(symbol: &str) -> TechnicalAnalysis {
        TechnicalAnalysis {
            symbol: symbol.to_string(),
            summary: TechnicalSummary::default(),
            data: vec![TimePoint {
                timestamp: Some("2024-01-02T00:00:00".into()),
                open: Some(100.0.into()),
                high: Some(105.0.into()),
                low: Some(99.0.into()),
                close: Some(103.0.into()),
                sma_20: Some(101.0.into()),
                ema_12: Some(102.0.into()),
                ..TimePoint::default()
            }],
        }
    }

    #[test]
    fn test_begin_requires_symbol() {
        let mut state = DashboardState::new(&Config::default(), Theme::Light);
        assert!(state.begin_analysis().is_err());

        state.set_symbol("  bbca ");
        let ticket = state.begin_analysis().unwrap();
        assert_eq!(ticket.symbol, "BBCA");
        assert_eq!(ticket.query.interval.as_deref(), Some("1d"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = DashboardState::new(&Config::default(), Theme::Light);
        state.set_symbol("BBCA");
        let first = state.begin_analysis().unwrap();
        state.set_symbol("TLKM");
        let second = state.begin_analysis().unwrap();

        // Newer request resolves first
        state.apply_analysis(&second, analysis("TLKM"), Utc::now()).unwrap();

        // Older one resolves late and must not overwrite
        let err = state.apply_analysis(&first, analysis("BBCA"), Utc::now()).unwrap_err();
        assert!(matches!(err, DashboardError::StaleResponse(_)));
        assert_eq!(state.analysis().unwrap().symbol, "TLKM");
    }

    #[test]
    fn test_toggling_overlays_rebuilds_series() {
        let mut state = DashboardState::new(&Config::default(), Theme::Light);
        state.set_symbol("BBCA");
        let ticket = state.begin_analysis().unwrap();
        state.apply_analysis(&ticket, analysis("BBCA"), Utc::now()).unwrap();

        // Default config plots SMA only
        let series = state.series().unwrap();
        assert!(series.overlay(Indicator::Sma20).is_some());
        assert!(series.overlay(Indicator::Ema12).is_none());

        state.toggle_ema();
        state.toggle_sma();
        let series = state.series().unwrap();
        assert!(series.overlay(Indicator::Sma20).is_none());
        assert!(series.overlay(Indicator::Ema12).is_some());
    }

    #[test]
    fn test_config_build_settings_reach_builder() {
        let config = Config {
            missing_timestamp: MissingTimestamp::Exclude,
            ..Config::default()
        };
        let mut state = DashboardState::new(&config, Theme::Light);
        state.set_symbol("BBCA");
        let ticket = state.begin_analysis().unwrap();

        let mut undated = analysis("BBCA");
        undated.data[0].timestamp = None;
        let series = state.apply_analysis(&ticket, undated, Utc::now()).unwrap();
        assert!(series.candles.is_empty());
    }

    #[test]
    fn test_toggle_theme() {
        let mut state = DashboardState::new(&Config::default(), Theme::Dark);
        assert_eq!(state.toggle_theme(), Theme::Light);
        assert_eq!(state.theme, Theme::Light);
    }
}
