//! How a course's audit ended
//!
//! A course is pending until its record exists; every record then reports
//! exactly one terminal state. There are no retries at course level.

use std::fmt;

/// Terminal state of an audited course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseState {
    /// All sub-fetches completed and a metrics record was produced
    Succeeded,

    /// An error escaped one of the sub-fetches; an error record was produced
    Failed,
}

impl CourseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CourseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
