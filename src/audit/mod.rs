//! Audit module - turns LMS resources into per-course engagement records
//!
//! This module contains:
//! - Assignment classification (classic quiz / New Quiz / other)
//! - Student membership and participation arithmetic
//! - The course lifecycle state
//! - The sequential course auditor

mod classify;
mod coordinator;
mod participation;
mod record;
mod state;

pub use classify::{classify_assignment, partition_published, AssignmentClass};
pub use coordinator::{CourseAuditor, PageTally};
pub use participation::{round1, CategoryTally, Participation, StudentSet};
pub use record::{AuditOutcome, CourseAuditRecord, CourseMetrics};
pub use state::CourseState;

use crate::config::Config;

/// Runs a complete audit of the configured courses
///
/// This is the main entry point. It builds the client from `config`,
/// audits every course in `course_ids` in order and returns one record per
/// course, failed courses included.
pub async fn run_audit(config: &Config, course_ids: &[u64]) -> crate::Result<Vec<CourseAuditRecord>> {
    let auditor = CourseAuditor::from_config(config)?;
    Ok(auditor.run(course_ids).await)
}
