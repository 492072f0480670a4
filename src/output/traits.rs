//! Result sink trait and error types
//!
//! A sink receives the complete, ordered list of course records once the run
//! has finished and renders or exports it.

use crate::audit::CourseAuditRecord;
use crate::output::layout::RecordLayout;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result sinks
///
/// Implementations receive the records in input course order and must emit
/// them in that order, one row per record, columns as given by `layout`.
pub trait ResultSink {
    /// Renders or exports every record
    ///
    /// # Arguments
    ///
    /// * `layout` - Column order and error-record conventions
    /// * `records` - One record per audited course, in input order
    fn emit(&mut self, layout: &RecordLayout, records: &[CourseAuditRecord]) -> OutputResult<()>;
}
