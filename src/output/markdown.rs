//! Markdown report generation
//!
//! This module writes a human-readable report of an audit run: run
//! information, totals, the per-course table and failed courses.

use crate::audit::CourseAuditRecord;
use crate::output::layout::RecordLayout;
use crate::output::stats::RunSummary;
use crate::output::traits::{OutputResult, ResultSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the markdown report to a file
pub struct MarkdownSink {
    path: PathBuf,
    summary: RunSummary,
}

impl MarkdownSink {
    pub fn new(path: impl AsRef<Path>, summary: RunSummary) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            summary,
        }
    }
}

impl ResultSink for MarkdownSink {
    fn emit(&mut self, layout: &RecordLayout, records: &[CourseAuditRecord]) -> OutputResult<()> {
        let markdown = format_markdown_report(&self.summary, layout, records);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!("Wrote report to {}", self.path.display());
        Ok(())
    }
}

/// Formats a run as markdown
///
/// # Arguments
///
/// * `summary` - Run totals and timestamps
/// * `layout` - Column order for the course table
/// * `records` - Course records in input order
pub fn format_markdown_report(
    summary: &RunSummary,
    layout: &RecordLayout,
    records: &[CourseAuditRecord],
) -> String {
    let mut md = String::new();

    md.push_str("# Course Audit Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    let duration = summary.duration_seconds();
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        duration,
        duration as f64 / 60.0
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Totals
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Courses Audited**: {}\n",
        summary.courses_audited
    ));
    md.push_str(&format!("- **Succeeded**: {}\n", summary.courses_succeeded));
    md.push_str(&format!("- **Failed**: {}\n", summary.courses_failed));
    md.push_str(&format!(
        "- **Active Students**: {}\n",
        summary.total_students
    ));
    md.push_str(&format!("- **Module Pages**: {}\n\n", summary.total_pages));

    if !summary.provider_embeds.is_empty() {
        md.push_str("## Embeds\n\n");
        md.push_str("| Provider | Embeds | Pages |\n");
        md.push_str("|----------|--------|-------|\n");
        for (label, count) in &summary.provider_embeds {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                label, count.embeds, count.pages
            ));
        }
        md.push('\n');
    }

    // Course table
    if !records.is_empty() {
        let headers = layout.headers();
        md.push_str("## Courses\n\n");
        md.push_str(&table_line(&headers));
        let rule: Vec<String> = headers.iter().map(|_| "---".to_string()).collect();
        md.push_str(&table_line(&rule));
        for record in records {
            md.push_str(&table_line(&layout.values(record)));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failed Courses\n\n");
        for (course_id, error) in &summary.failures {
            md.push_str(&format!("- **{}**: {}\n", course_id, error));
        }
        md.push('\n');
    }

    md
}

fn table_line(cells: &[String]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
    format!("| {} |\n", escaped.join(" | "))
}
