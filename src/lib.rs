pub mod types;
pub mod error;
pub mod config;
pub mod time;
pub mod chart;
pub mod api;
pub mod dashboard;

pub use types::*;
pub use error::{DashboardError, Result};
