pub mod client;

pub use client::{error_from_body, ApiClient, DataQuery};
