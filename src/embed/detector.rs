//! HTML embed detection
//!
//! Counts references to a media provider inside a page body:
//! - `<iframe src>` matching the provider directly, or through an external
//!   tool launch URL whose forwarded `url` parameter matches
//! - `<a href>` matching the provider directly
//!
//! Matching is a case-insensitive substring test. Every occurrence counts.

use crate::embed::redirect::unwrap_redirect;
use scraper::{Html, Selector};

/// Counts embeds of one provider in an HTML document or fragment
///
/// # Arguments
///
/// * `html` - The page body
/// * `provider_id` - Substring identifying the provider, e.g. `"panopto"`
///
/// # Example
///
/// ```
/// use course_audit::embed::count_embeds;
///
/// let html = r#"<p><a href="https://uni.panopto.eu/v/1">Lecture</a></p>
///     <iframe src="https://uni.panopto.eu/Embed.aspx?id=1"></iframe>"#;
/// assert_eq!(count_embeds(html, "panopto"), 2);
/// assert_eq!(count_embeds(html, "h5p"), 0);
/// ```
pub fn count_embeds(html: &str, provider_id: &str) -> usize {
    let document = Html::parse_document(html);
    count_in_document(&document, &provider_id.to_lowercase())
}

/// Counts embeds for several providers with a single parse
///
/// The result is in the same order as `provider_ids`.
pub fn scan_page<S: AsRef<str>>(html: &str, provider_ids: &[S]) -> Vec<usize> {
    let document = Html::parse_document(html);
    provider_ids
        .iter()
        .map(|id| count_in_document(&document, &id.as_ref().to_lowercase()))
        .collect()
}

fn count_in_document(document: &Html, needle: &str) -> usize {
    let mut count = 0;

    if let Ok(iframe_selector) = Selector::parse("iframe[src]") {
        count += document
            .select(&iframe_selector)
            .filter_map(|element| element.value().attr("src"))
            .filter(|src| iframe_source_matches(src, needle))
            .count();
    }

    if let Ok(a_selector) = Selector::parse("a[href]") {
        count += document
            .select(&a_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| href.to_lowercase().contains(needle))
            .count();
    }

    count
}

fn iframe_source_matches(src: &str, needle: &str) -> bool {
    if src.to_lowercase().contains(needle) {
        return true;
    }

    match unwrap_redirect(src) {
        Ok(Some(target)) => target.to_lowercase().contains(needle),
        Ok(None) => false,
        Err(e) => {
            tracing::debug!("Ignoring unreadable iframe source {}: {}", src, e);
            false
        }
    }
}
