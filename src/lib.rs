//! Course-Audit: engagement statistics for LMS courses
//!
//! This crate walks a Canvas-style REST API one request at a time, honoring
//! pagination links and rate-limit backoff, and condenses each course into a
//! flat audit record: student count, quiz/assignment/discussion participation
//! and third-party media embeds found on module pages.

pub mod api;
pub mod audit;
pub mod config;
pub mod embed;
pub mod output;

use thiserror::Error;

/// Main error type for Course-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Pagination exceeded {max_pages} pages starting at {url}")]
    PageLimitExceeded { url: String, max_pages: u32 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl AuditError {
    /// Returns true for failures of the network transfer itself, including
    /// a runaway pagination walk
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::PageLimitExceeded { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Course-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use api::{CanvasApi, Extract};
pub use audit::{AuditOutcome, CourseAuditRecord, CourseAuditor, CourseState};
pub use config::Config;
pub use embed::{count_embeds, unwrap_redirect, EmbedCount};
pub use output::{RecordLayout, ResultSink};
