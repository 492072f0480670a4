//! Unwrapping of external tool launch URLs

use crate::{UrlError, UrlResult};
use url::Url;

/// Path marker of the LMS's generic external tool launch endpoint
pub const EXTERNAL_TOOL_RETRIEVE: &str = "/external_tools/retrieve";

/// Stand-in origin used to parse root-relative launch URLs
const RELATIVE_BASE: &str = "https://relative.invalid/";

/// Extracts the forwarded target of an external tool launch URL
///
/// Media is often embedded through the LMS's launch endpoint, e.g.
/// `/courses/1/external_tools/retrieve?url=https%3A%2F%2Fvideo.example%2Fv%2F9`,
/// so the provider only appears in the percent-encoded `url` parameter.
///
/// # Returns
///
/// * `Ok(Some(target))` - the decoded `url` parameter of a launch URL
/// * `Ok(None)` - not a launch URL, or it carries no `url` parameter
/// * `Err(UrlError)` - the URL does not parse or the parameter's encoding is broken
///
/// # Example
///
/// ```
/// use course_audit::embed::unwrap_redirect;
///
/// let src = "https://lms.example/courses/1/external_tools/retrieve?display=borderless&url=https%3A%2F%2Fpanopto.example.com%2Fx";
/// assert_eq!(
///     unwrap_redirect(src).unwrap().as_deref(),
///     Some("https://panopto.example.com/x")
/// );
/// assert_eq!(unwrap_redirect("https://panopto.example.com/x").unwrap(), None);
/// ```
pub fn unwrap_redirect(src: &str) -> UrlResult<Option<String>> {
    let url = parse_possibly_relative(src.trim())?;

    if !url.path().contains(EXTERNAL_TOOL_RETRIEVE) {
        return Ok(None);
    }

    let raw = url.query().and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("url="))
    });

    match raw {
        Some(value) if !value.is_empty() => percent_decode(value).map(Some),
        _ => Ok(None),
    }
}

/// Parses absolute, scheme-relative and root-relative URLs
fn parse_possibly_relative(src: &str) -> UrlResult<Url> {
    match Url::parse(src) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(src))
            .map_err(|e| UrlError::Parse(format!("{}: {}", src, e))),
        Err(e) => Err(UrlError::Parse(format!("{}: {}", src, e))),
    }
}

/// Decodes `%XX` escapes, rejecting truncated escapes and invalid UTF-8
///
/// `+` is left as-is; launch URLs encode the target as a URI component.
fn percent_decode(value: &str) -> UrlResult<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    UrlError::Malformed(format!("bad percent-escape at byte {} of '{}'", i, value))
                })?;
            decoded.push(hex);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded)
        .map_err(|_| UrlError::Malformed(format!("'{}' does not decode to UTF-8", value)))
}
