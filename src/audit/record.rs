//! Per-course audit results

use crate::audit::participation::{CategoryTally, Participation};
use crate::audit::state::CourseState;
use crate::embed::EmbedCount;

/// Counters gathered for one successfully audited course
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseMetrics {
    /// Distinct active students
    pub students: usize,
    pub classic_quizzes: CategoryTally,
    pub new_quizzes: CategoryTally,
    pub other_assignments: CategoryTally,
    pub discussions: CategoryTally,
    /// Page items across all modules
    pub module_pages: usize,
    /// One entry per configured provider, in configuration order
    pub embeds: Vec<EmbedCount>,
}

impl CourseMetrics {
    pub fn classic_quiz_participation(&self) -> Participation {
        self.classic_quizzes.participation(self.students)
    }

    pub fn new_quiz_participation(&self) -> Participation {
        self.new_quizzes.participation(self.students)
    }

    pub fn other_assignment_participation(&self) -> Participation {
        self.other_assignments.participation(self.students)
    }

    pub fn discussion_participation(&self) -> Participation {
        self.discussions.participation(self.students)
    }
}

/// How the audit of a course ended
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Succeeded(CourseMetrics),
    Failed { error: String },
}

/// The result of auditing one course
///
/// Built once after all sub-fetches finish and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseAuditRecord {
    pub course_id: u64,
    pub course_name: String,
    pub outcome: AuditOutcome,
}

impl CourseAuditRecord {
    pub fn succeeded(course_id: u64, course_name: String, metrics: CourseMetrics) -> Self {
        Self {
            course_id,
            course_name,
            outcome: AuditOutcome::Succeeded(metrics),
        }
    }

    pub fn failed(course_id: u64, course_name: String, error: String) -> Self {
        Self {
            course_id,
            course_name,
            outcome: AuditOutcome::Failed { error },
        }
    }

    pub fn metrics(&self) -> Option<&CourseMetrics> {
        match &self.outcome {
            AuditOutcome::Succeeded(metrics) => Some(metrics),
            AuditOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            AuditOutcome::Succeeded(_) => None,
            AuditOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Failed { .. })
    }

    /// Terminal state this record represents
    pub fn state(&self) -> CourseState {
        match self.outcome {
            AuditOutcome::Succeeded(_) => CourseState::Succeeded,
            AuditOutcome::Failed { .. } => CourseState::Failed,
        }
    }
}
