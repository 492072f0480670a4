//! Response header helpers for pagination and rate limiting

use url::Url;

/// Finds the `rel="next"` target in a `Link` header
///
/// Relative targets are resolved against `current`. Returns `None` when the
/// header has no next entry or the target does not parse.
///
/// # Example
///
/// ```
/// use course_audit::api::next_link;
/// use url::Url;
///
/// let current = Url::parse("https://lms.example/api/v1/courses/1/quizzes?page=1").unwrap();
/// let header = r#"<https://lms.example/api/v1/courses/1/quizzes?page=2>; rel="next", <https://lms.example/api/v1/courses/1/quizzes?page=1>; rel="first""#;
/// let next = next_link(header, &current).unwrap();
/// assert_eq!(next.query(), Some("page=2"));
/// ```
pub fn next_link(header: &str, current: &Url) -> Option<Url> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| {
                    rel.trim_matches('"')
                        .split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("next"))
                })
                .unwrap_or(false)
        });

        if !is_next {
            return None;
        }

        let target = target.trim_start_matches('<').trim_end_matches('>').trim();
        current.join(target).ok()
    })
}

/// Reads a `Retry-After` value in seconds
///
/// Absent, non-numeric and non-positive values fall back to `default`.
pub fn retry_after_secs(header: Option<&str>, default: f64) -> f64 {
    header
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .unwrap_or(default)
}
