//! Embed module for third-party media detection
//!
//! This module finds video-lecture and interactive-content embeds in page
//! HTML, including embeds routed through the LMS's external tool launcher.

mod detector;
mod redirect;

pub use detector::{count_embeds, scan_page};
pub use redirect::{unwrap_redirect, EXTERNAL_TOOL_RETRIEVE};

/// Embed tally for one provider across the pages of a course
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedCount {
    /// Total matching iframes and links
    pub embeds: usize,

    /// Pages with at least one match
    pub pages: usize,
}

impl EmbedCount {
    /// Adds the matches found on one page
    pub fn record_page(&mut self, matches: usize) {
        self.embeds += matches;
        if matches > 0 {
            self.pages += 1;
        }
    }
}
