/// Centralized error types for the dashboard client
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    // Network Errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Backend Errors
    /// Non-2xx response whose body carried `{"detail": ...}`
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// Non-2xx response with an unparseable body
    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },

    // Data Errors
    #[error("Deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Missing data: {0}")]
    MissingData(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    // Request sequencing
    #[error("Stale response discarded: {0}")]
    StaleResponse(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    /// Check if the failed call is worth retrying on the next poll
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::HttpError(e) => e.is_timeout() || e.is_connect(),
            DashboardError::HttpStatus { status } | DashboardError::Api { status, .. } => {
                *status >= 500
            }
            DashboardError::StaleResponse(_) => true,
            _ => false,
        }
    }

    /// Message rendered inline in the panel that triggered the call
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Api { detail, .. } => detail.clone(),
            DashboardError::HttpError(e) if e.is_connect() => {
                "Cannot reach the backend API".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &str {
        match self {
            DashboardError::HttpError(_) => "NET_001",
            DashboardError::InvalidUrl(_) => "NET_002",
            DashboardError::Api { .. } => "API_001",
            DashboardError::HttpStatus { .. } => "API_002",
            DashboardError::DeserializationError(_) => "DATA_001",
            DashboardError::MissingData(_) => "DATA_002",
            DashboardError::ConfigError(_) => "CFG_001",
            DashboardError::InvalidParameter(_) => "CFG_002",
            DashboardError::FileError(_) => "FILE_001",
            DashboardError::StaleResponse(_) => "SEQ_001",
        }
    }
}
