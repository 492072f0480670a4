//! Configuration module for Course-Audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use course_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Auditing {} courses", config.audit.course_ids.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuditConfig, CanvasConfig, Config, OutputConfig, PagerConfig, ProviderConfig,
    UserAgentConfig, ACCESS_TOKEN_ENV,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
