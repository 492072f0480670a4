//! Run-level statistics
//!
//! This module condenses the records of one run into totals and prints them
//! at the end of the run.

use crate::audit::{CourseAuditRecord, CourseState};
use crate::config::ProviderConfig;
use crate::embed::EmbedCount;
use chrono::{DateTime, Utc};

/// Totals across every course of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, if known
    pub config_hash: Option<String>,

    pub courses_audited: usize,
    pub courses_succeeded: usize,
    pub courses_failed: usize,

    /// Students summed over successful courses
    pub total_students: usize,

    /// Module pages summed over successful courses
    pub total_pages: usize,

    /// (label, totals) per provider, in configuration order
    pub provider_embeds: Vec<(String, EmbedCount)>,

    /// (course id, error message) for every failed course
    pub failures: Vec<(u64, String)>,
}

impl RunSummary {
    /// Builds the summary from the finished records
    pub fn from_records(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        providers: &[ProviderConfig],
        records: &[CourseAuditRecord],
    ) -> Self {
        let mut provider_embeds: Vec<(String, EmbedCount)> = providers
            .iter()
            .map(|p| (p.label.clone(), EmbedCount::default()))
            .collect();
        let mut total_students = 0;
        let mut total_pages = 0;
        let mut failures = Vec::new();

        for record in records {
            match record.metrics() {
                Some(metrics) => {
                    total_students += metrics.students;
                    total_pages += metrics.module_pages;
                    for ((_, total), count) in provider_embeds.iter_mut().zip(&metrics.embeds) {
                        total.embeds += count.embeds;
                        total.pages += count.pages;
                    }
                }
                None => failures.push((
                    record.course_id,
                    record.error().unwrap_or_default().to_string(),
                )),
            }
        }

        Self {
            started_at,
            finished_at,
            config_hash: None,
            courses_audited: records.len(),
            courses_succeeded: records
                .iter()
                .filter(|r| r.state() == CourseState::Succeeded)
                .count(),
            courses_failed: failures.len(),
            total_students,
            total_pages,
            provider_embeds,
            failures,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("\n=== Audit Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {} seconds", summary.duration_seconds());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Courses:");
    println!("  Audited: {}", summary.courses_audited);
    println!("  Succeeded: {}", summary.courses_succeeded);
    println!("  Failed: {}", summary.courses_failed);
    println!("  Active students: {}", summary.total_students);
    println!("  Module pages: {}", summary.total_pages);
    println!();

    if !summary.provider_embeds.is_empty() {
        println!("Embeds:");
        for (label, count) in &summary.provider_embeds {
            println!(
                "  {}: {} embeds on {} pages",
                label, count.embeds, count.pages
            );
        }
        println!();
    }

    if !summary.failures.is_empty() {
        println!("Failed Courses ({}):", summary.failures.len());
        for (course_id, error) in &summary.failures {
            println!("  - {}: {}", course_id, error);
        }
    }
}
