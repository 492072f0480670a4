//! CSV export

use crate::audit::CourseAuditRecord;
use crate::output::layout::RecordLayout;
use crate::output::traits::{OutputResult, ResultSink};
use std::path::{Path, PathBuf};

/// Writes a header row plus one row per record to a CSV file
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn emit(&mut self, layout: &RecordLayout, records: &[CourseAuditRecord]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;

        writer.write_record(layout.headers())?;
        for record in records {
            writer.write_record(layout.values(record))?;
        }
        writer.flush()?;

        tracing::info!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}
