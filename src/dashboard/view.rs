/// Text and JSON presentation of analysis results
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::time::session::to_wib;
use crate::types::{ChartSeriesSet, SessionState, TechnicalAnalysis};

const MISSING: &str = "—";

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}", v))
}

/// Session banner, e.g. `Market Open · 09:15 WIB`
pub fn session_banner(state: SessionState, now: DateTime<Utc>) -> String {
    format!("{} · {} WIB", state.label(), to_wib(now).format("%H:%M"))
}

pub fn render_summary(analysis: &TechnicalAnalysis, series: &ChartSeriesSet) -> String {
    let s = &analysis.summary;
    let mut lines = vec![
        analysis.symbol.clone(),
        format!("  Price:       {}", fmt_opt(s.price)),
        format!("  RSI:         {}", fmt_opt(s.rsi)),
        format!("  MACD:        {} / {}", fmt_opt(s.macd), fmt_opt(s.macd_signal)),
        format!("  SMA 20/50:   {} / {}", fmt_opt(s.sma_20), fmt_opt(s.sma_50)),
        format!("  Candles:     {}", series.candles.len()),
    ];

    if let Some(volume) = &series.volume {
        lines.push(format!("  Volume bars: {}", volume.len()));
    }
    lines.extend(series.overlays.iter().map(|overlay| {
        format!(
            "  {:<12} {} points",
            format!("{}:", overlay.indicator.as_str()),
            overlay.points.len()
        )
    }));

    if let Some(last) = series.candles.last() {
        let when = DateTime::<Utc>::from_timestamp(last.time, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| last.time.to_string());
        lines.push(format!(
            "  Last bar:    {} O {:.2} H {:.2} L {:.2} C {:.2}",
            when, last.open, last.high, last.low, last.close
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Series payload for an external chart renderer
pub fn series_json(series: &ChartSeriesSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(series)?)
}
