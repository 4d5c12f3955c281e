/// Chart series builder
///
/// Turns an unordered analysis payload into sorted, numeric series for the
/// renderer. Every series filters points on its own predicate: a row missing
/// `close` drops out of the candles but can still feed `sma_20`.
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::chart::coerce::{coerce_number, coerce_timestamp};
use crate::types::{
    BarDirection, Candle, ChartSeriesSet, Config, FieldValue, Indicator, MissingTimestamp,
    OverlaySeries, OverlayToggleSet, PresenceGate, SeriesPoint, TimePoint, VolumeBar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub presence_gate: PresenceGate,
    pub missing_timestamp: MissingTimestamp,
    /// Stamp used for rows without a timestamp under `FallbackToNow`
    pub now: DateTime<Utc>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            presence_gate: PresenceGate::FirstPoint,
            missing_timestamp: MissingTimestamp::FallbackToNow,
            now: Utc::now(),
        }
    }
}

impl BuildOptions {
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        BuildOptions {
            presence_gate: config.presence_gate,
            missing_timestamp: config.missing_timestamp,
            now,
        }
    }
}

/// Build every series with the default (legacy-compatible) options
pub fn build_series(points: &[TimePoint], overlays: OverlayToggleSet) -> ChartSeriesSet {
    build_series_with(points, overlays, &BuildOptions::default())
}

pub fn build_series_with(
    points: &[TimePoint],
    overlays: OverlayToggleSet,
    options: &BuildOptions,
) -> ChartSeriesSet {
    let times: Vec<Option<i64>> = points.iter().map(|p| resolve_time(p, options)).collect();

    let candles = build_candles(points, &times);

    let volume = if series_present(points, options.presence_gate, |p| p.volume.as_ref()) {
        let bars = build_volume(points, &times);
        (!bars.is_empty()).then_some(bars)
    } else {
        None
    };

    let mut overlay_series = Vec::new();
    for indicator in Indicator::ALL {
        if !indicator.is_enabled(&overlays) {
            continue;
        }
        if !series_present(points, options.presence_gate, |p| indicator.field(p)) {
            debug!("Skipping {}: not present in payload", indicator.as_str());
            continue;
        }

        let series = build_line(points, &times, |p| indicator.field(p));
        if series.is_empty() {
            debug!("Skipping {}: no numeric points", indicator.as_str());
            continue;
        }

        overlay_series.push(OverlaySeries {
            indicator,
            points: series,
        });
    }

    debug!(
        "Built series from {} points: {} candles, {} volume bars, {} overlays",
        points.len(),
        candles.len(),
        volume.as_ref().map_or(0, |v| v.len()),
        overlay_series.len()
    );

    ChartSeriesSet {
        candles,
        volume,
        overlays: overlay_series,
    }
}

fn resolve_time(point: &TimePoint, options: &BuildOptions) -> Option<i64> {
    match &point.timestamp {
        Some(ts) => coerce_timestamp(ts),
        None => match options.missing_timestamp {
            MissingTimestamp::FallbackToNow => Some(options.now.timestamp()),
            MissingTimestamp::Exclude => None,
        },
    }
}

/// Whether an optional series should be built at all
fn series_present<F>(points: &[TimePoint], gate: PresenceGate, field: F) -> bool
where
    F: Fn(&TimePoint) -> Option<&FieldValue>,
{
    match gate {
        PresenceGate::FirstPoint => points.first().is_some_and(|p| field(p).is_some()),
        PresenceGate::AnyPoint => points.iter().any(|p| field(p).is_some()),
    }
}

fn number(field: Option<&FieldValue>) -> Option<f64> {
    field.and_then(coerce_number)
}

fn build_candles(points: &[TimePoint], times: &[Option<i64>]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = points
        .iter()
        .zip(times)
        .filter_map(|(p, time)| {
            Some(Candle {
                time: (*time)?,
                open: number(p.open.as_ref())?,
                high: number(p.high.as_ref())?,
                low: number(p.low.as_ref())?,
                close: number(p.close.as_ref())?,
            })
        })
        .collect();

    candles.sort_by_key(|c| c.time);
    candles
}

fn build_volume(points: &[TimePoint], times: &[Option<i64>]) -> Vec<VolumeBar> {
    let mut bars: Vec<VolumeBar> = points
        .iter()
        .zip(times)
        .filter_map(|(p, time)| {
            let time = (*time)?;
            let value = number(p.volume.as_ref())?;
            let up = match (number(p.open.as_ref()), number(p.close.as_ref())) {
                (Some(open), Some(close)) => close >= open,
                _ => false,
            };
            Some(VolumeBar {
                time,
                value,
                direction: if up { BarDirection::Up } else { BarDirection::Down },
            })
        })
        .collect();

    bars.sort_by_key(|b| b.time);
    bars
}

fn build_line<F>(points: &[TimePoint], times: &[Option<i64>], field: F) -> Vec<SeriesPoint>
where
    F: Fn(&TimePoint) -> Option<&FieldValue>,
{
    let mut line: Vec<SeriesPoint> = points
        .iter()
        .zip(times)
        .filter_map(|(p, time)| {
            Some(SeriesPoint {
                time: (*time)?,
                value: number(field(p))?,
            })
        })
        .collect();

    line.sort_by_key(|s| s.time);
    line
}
