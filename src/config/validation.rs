use crate::config::types::{
    AuditConfig, CanvasConfig, Config, PagerConfig, ProviderConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Longest accepted duration of one Retry-After "second" (ms)
const MAX_RETRY_AFTER_UNIT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_canvas_config(&config.canvas)?;
    validate_pager_config(&config.pager)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_audit_config(&config.audit)?;
    validate_providers(&config.providers)?;
    Ok(())
}

/// Validates LMS connection settings
fn validate_canvas_config(config: &CanvasConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.per_page < 1 || config.per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "per-page must be between 1 and 100, got {}",
            config.per_page
        )));
    }

    Ok(())
}

/// Validates pacing settings
fn validate_pager_config(config: &PagerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.page_body_attempts < 1 {
        return Err(ConfigError::Validation(
            "page-body-attempts must be >= 1".to_string(),
        ));
    }

    if !config.retry_after_default.is_finite() || config.retry_after_default < 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry-after-default must be a non-negative number, got {}",
            config.retry_after_default
        )));
    }

    if config.retry_after_unit > MAX_RETRY_AFTER_UNIT_MS {
        return Err(ConfigError::Validation(format!(
            "retry-after-unit must be at most {}ms, got {}",
            MAX_RETRY_AFTER_UNIT_MS, config.retry_after_unit
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation("timeout must be >= 1s".to_string()));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates the course list and record markers
fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.course_ids.is_empty() {
        return Err(ConfigError::Validation(
            "course-ids must list at least one course".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for id in &config.course_ids {
        if !seen.insert(id) {
            return Err(ConfigError::Validation(format!(
                "course-ids contains {} more than once",
                id
            )));
        }
    }

    if config.new_quiz_domains.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "new-quiz-domains cannot contain empty entries".to_string(),
        ));
    }

    for (key, value) in [
        ("placeholder-course-name", &config.placeholder_course_name),
        ("error-course-name", &config.error_course_name),
        ("error-marker", &config.error_marker),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Validates tracked embed providers
fn validate_providers(providers: &[ProviderConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for provider in providers {
        if provider.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider id cannot be empty".to_string(),
            ));
        }

        if provider.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "provider '{}' needs a label",
                provider.id
            )));
        }

        if !seen.insert(provider.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "provider '{}' is listed more than once",
                provider.id
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
