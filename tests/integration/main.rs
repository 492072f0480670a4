//! Integration tests for Course-Audit
//!
//! These tests use wiremock to stand in for the LMS REST API and drive the
//! pager, the auditor and the sinks end-to-end.

mod pager_tests;

use course_audit::config::{parse_config, Config};

/// Builds a validated configuration pointing at `base_url`
///
/// The courtesy delay is off and one Retry-After second lasts 10ms so
/// backoff paths run quickly.
pub fn test_config(base_url: &str, course_ids: &[u64]) -> Config {
    let ids: Vec<String> = course_ids.iter().map(|id| id.to_string()).collect();
    let toml = format!(
        r#"
[canvas]
base-url = "{}"
per-page = 50

[pager]
request-delay = 0
retry-after-unit = 10
timeout = 5

[user-agent]
name = "TestBot"
version = "1.0.0"

[audit]
course-ids = [{}]
new-quiz-domains = ["quiz-lti.example.com"]

[[provider]]
id = "panopto"
label = "Panopto"

[[provider]]
id = "h5p"
label = "H5P"
"#,
        base_url,
        ids.join(", ")
    );

    parse_config(&toml).expect("Failed to parse test config")
}
