pub mod coerce;
pub mod series;

pub use coerce::{coerce_number, coerce_timestamp};
pub use series::{build_series, build_series_with, BuildOptions};
