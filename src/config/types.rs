use serde::Deserialize;
use std::time::Duration;

/// Environment variable consulted when the config carries no access token
pub const ACCESS_TOKEN_ENV: &str = "CANVAS_ACCESS_TOKEN";

/// Main configuration structure for Course-Audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub pager: PagerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub audit: AuditConfig,
    #[serde(rename = "provider", default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Returns the bearer token from the config, falling back to the
    /// `CANVAS_ACCESS_TOKEN` environment variable
    pub fn access_token(&self) -> Option<String> {
        self.canvas
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }
}

/// Connection settings for the LMS REST API
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Root of the LMS, e.g. `https://canvas.example.edu`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Bearer token attached to every request
    #[serde(rename = "access-token", default)]
    pub access_token: Option<String>,

    /// Page size requested from collection endpoints
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,
}

/// Request pacing and pagination limits
#[derive(Debug, Clone, Deserialize)]
pub struct PagerConfig {
    /// Delay after every completed (non-429) request (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Backoff used when `Retry-After` is absent or unusable (seconds)
    #[serde(rename = "retry-after-default", default = "default_retry_after")]
    pub retry_after_default: f64,

    /// Length of one `Retry-After` second (milliseconds)
    #[serde(rename = "retry-after-unit", default = "default_retry_after_unit")]
    pub retry_after_unit: u64,

    /// Maximum pages followed for one collection
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Attempts for a single-resource fetch before giving up
    #[serde(rename = "page-body-attempts", default = "default_page_body_attempts")]
    pub page_body_attempts: u32,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl PagerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn retry_after_unit(&self) -> Duration {
        Duration::from_millis(self.retry_after_unit)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            retry_after_default: default_retry_after(),
            retry_after_unit: default_retry_after_unit(),
            max_pages: default_max_pages(),
            page_body_attempts: default_page_body_attempts(),
            timeout: default_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version of the client
    #[serde(default = "default_agent_version")]
    pub version: String,

    /// Email address for operator contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_email: None,
        }
    }
}

/// What to audit and how to label failures
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Courses to audit, in order
    #[serde(rename = "course-ids")]
    pub course_ids: Vec<u64>,

    /// Substrings of an external tool URL that mark a New Quiz
    #[serde(rename = "new-quiz-domains", default = "default_new_quiz_domains")]
    pub new_quiz_domains: Vec<String>,

    /// Course name used when course metadata cannot be read
    #[serde(rename = "placeholder-course-name", default = "default_placeholder_name")]
    pub placeholder_course_name: String,

    /// Course name written on an error record
    #[serde(rename = "error-course-name", default = "default_error_course_name")]
    pub error_course_name: String,

    /// Value written in every numeric field of an error record
    #[serde(rename = "error-marker", default = "default_error_marker")]
    pub error_marker: String,
}

/// A media provider whose embeds are counted on module pages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Substring looked for in iframe sources and link targets
    pub id: String,

    /// Display name used in column headers
    pub label: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV export
    #[serde(rename = "csv-path", default)]
    pub csv_path: Option<String>,

    /// Path of the markdown report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_per_page() -> u32 {
    100
}

fn default_request_delay() -> u64 {
    800
}

fn default_retry_after() -> f64 {
    2.0
}

fn default_retry_after_unit() -> u64 {
    1000
}

fn default_max_pages() -> u32 {
    1000
}

fn default_page_body_attempts() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

fn default_agent_name() -> String {
    "course-audit".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_new_quiz_domains() -> Vec<String> {
    vec!["quiz-lti-dub-prod.instructure.com".to_string()]
}

fn default_placeholder_name() -> String {
    "Unknown".to_string()
}

fn default_error_course_name() -> String {
    "ERROR".to_string()
}

fn default_error_marker() -> String {
    "ERR".to_string()
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            id: "panopto".to_string(),
            label: "Panopto".to_string(),
        },
        ProviderConfig {
            id: "h5p".to_string(),
            label: "H5P".to_string(),
        },
    ]
}
