//! Output module for rendering and exporting audit records
//!
//! This module handles:
//! - Flattening course records into ordered columns
//! - Console, CSV and markdown sinks
//! - Run-level statistics

mod csv_output;
mod layout;
mod markdown;
pub mod stats;
mod table;
mod traits;

pub use csv_output::CsvSink;
pub use layout::RecordLayout;
pub use markdown::{format_markdown_report, MarkdownSink};
pub use stats::{print_summary, RunSummary};
pub use table::ConsoleTable;
pub use traits::{OutputError, OutputResult, ResultSink};
