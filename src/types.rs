/// Core type definitions for the dashboard client
use serde::{Deserialize, Serialize};

/// A loosely-typed field as delivered by the backend.
///
/// The backend serializes pandas frames, so numbers may arrive as JSON
/// numbers or numeric strings. Anything else is kept so coercion can reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One row of an analysis response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    #[serde(default)]
    pub timestamp: Option<FieldValue>,
    #[serde(default)]
    pub open: Option<FieldValue>,
    #[serde(default)]
    pub high: Option<FieldValue>,
    #[serde(default)]
    pub low: Option<FieldValue>,
    #[serde(default)]
    pub close: Option<FieldValue>,
    #[serde(default)]
    pub volume: Option<FieldValue>,
    #[serde(default)]
    pub sma_20: Option<FieldValue>,
    #[serde(default)]
    pub sma_50: Option<FieldValue>,
    #[serde(default)]
    pub ema_12: Option<FieldValue>,
    #[serde(default)]
    pub ema_26: Option<FieldValue>,
    #[serde(default)]
    pub bb_upper: Option<FieldValue>,
    #[serde(default)]
    pub bb_middle: Option<FieldValue>,
    #[serde(default)]
    pub bb_lower: Option<FieldValue>,
    /// Columns the chart does not plot (rsi, macd, stoch_k, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// IDX trading session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Closed,
    PreOpening,
    Open,
    LunchBreak,
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Closed => "CLOSED",
            SessionState::PreOpening => "PRE_OPENING",
            SessionState::Open => "OPEN",
            SessionState::LunchBreak => "LUNCH_BREAK",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SessionState::Closed => "Market Closed",
            SessionState::PreOpening => "Pre-Opening",
            SessionState::Open => "Market Open",
            SessionState::LunchBreak => "Lunch Break",
        }
    }

    pub fn is_trading(&self) -> bool {
        matches!(self, SessionState::Open)
    }
}

/// Which overlay groups are plotted on top of the candles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayToggleSet {
    pub sma: bool,
    pub ema: bool,
    pub bollinger_bands: bool,
}

/// Overlay indicator columns supplied pre-computed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "sma_20")]
    Sma20,
    #[serde(rename = "sma_50")]
    Sma50,
    #[serde(rename = "ema_12")]
    Ema12,
    #[serde(rename = "ema_26")]
    Ema26,
    #[serde(rename = "bb_upper")]
    BbUpper,
    #[serde(rename = "bb_middle")]
    BbMiddle,
    #[serde(rename = "bb_lower")]
    BbLower,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::Sma20,
        Indicator::Sma50,
        Indicator::Ema12,
        Indicator::Ema26,
        Indicator::BbUpper,
        Indicator::BbMiddle,
        Indicator::BbLower,
    ];

    /// Column name in the backend payload
    pub fn as_str(&self) -> &str {
        match self {
            Indicator::Sma20 => "sma_20",
            Indicator::Sma50 => "sma_50",
            Indicator::Ema12 => "ema_12",
            Indicator::Ema26 => "ema_26",
            Indicator::BbUpper => "bb_upper",
            Indicator::BbMiddle => "bb_middle",
            Indicator::BbLower => "bb_lower",
        }
    }

    pub fn field<'a>(&self, point: &'a TimePoint) -> Option<&'a FieldValue> {
        match self {
            Indicator::Sma20 => point.sma_20.as_ref(),
            Indicator::Sma50 => point.sma_50.as_ref(),
            Indicator::Ema12 => point.ema_12.as_ref(),
            Indicator::Ema26 => point.ema_26.as_ref(),
            Indicator::BbUpper => point.bb_upper.as_ref(),
            Indicator::BbMiddle => point.bb_middle.as_ref(),
            Indicator::BbLower => point.bb_lower.as_ref(),
        }
    }

    pub fn is_enabled(&self, overlays: &OverlayToggleSet) -> bool {
        match self {
            Indicator::Sma20 | Indicator::Sma50 => overlays.sma,
            Indicator::Ema12 | Indicator::Ema26 => overlays.ema,
            Indicator::BbUpper | Indicator::BbMiddle | Indicator::BbLower => {
                overlays.bollinger_bands
            }
        }
    }
}

/// Candlestick point for the primary series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Single-value point for overlay lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

/// Volume bar colour category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBar {
    pub time: i64,
    pub value: f64,
    pub direction: BarDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySeries {
    pub indicator: Indicator,
    pub points: Vec<SeriesPoint>,
}

/// Everything the renderer needs for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesSet {
    pub candles: Vec<Candle>,
    pub volume: Option<Vec<VolumeBar>>,
    pub overlays: Vec<OverlaySeries>,
}

impl ChartSeriesSet {
    pub fn overlay(&self, indicator: Indicator) -> Option<&OverlaySeries> {
        self.overlays.iter().find(|s| s.indicator == indicator)
    }
}

/// Symbol search / listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSymbol {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Latest-bar summary of a technical analysis response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<f64>,
    #[serde(default)]
    pub sma_20: Option<f64>,
    #[serde(default)]
    pub sma_50: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub symbol: String,
    #[serde(default)]
    pub summary: TechnicalSummary,
    #[serde(default)]
    pub data: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: String,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub data: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalAnalysis {
    pub symbol: String,
    #[serde(default)]
    pub analysis: serde_json::Value,
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub services: std::collections::BTreeMap<String, bool>,
}

/// UI colour theme, the one persisted preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// How the builder decides whether an optional series exists at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceGate {
    /// Only the first input point is checked for the field
    #[default]
    FirstPoint,
    /// Any point carrying the field is enough
    AnyPoint,
}

/// What to do with a point that has no timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTimestamp {
    /// Stamp it with the build instant
    #[default]
    FallbackToNow,
    /// Drop it from every series
    Exclude,
}

/// Configuration for the dashboard client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    // Backend
    pub api_base_url: String,
    pub request_timeout_sec: u64,

    // Market clock
    pub clock_poll_interval_sec: u64,

    // Analysis defaults
    pub default_interval: String,
    pub overlays: OverlayToggleSet,

    // Series building
    pub presence_gate: PresenceGate,
    pub missing_timestamp: MissingTimestamp,

    // Preferences
    pub preferences_path: String,

    // Logging
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout_sec: 30,
            clock_poll_interval_sec: 60,
            default_interval: "1d".to_string(),
            overlays: OverlayToggleSet {
                sma: true,
                ema: false,
                bollinger_bands: false,
            },
            presence_gate: PresenceGate::FirstPoint,
            missing_timestamp: MissingTimestamp::FallbackToNow,
            preferences_path: "data/preferences.json".to_string(),
            log_level: "idxchart=info".to_string(),
        }
    }
}
