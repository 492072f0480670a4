//! Aligned console table

use crate::audit::CourseAuditRecord;
use crate::output::layout::RecordLayout;
use crate::output::traits::{OutputResult, ResultSink};
use std::io::{self, Write};

/// Writes records as a plain-text table, one row per course
pub struct ConsoleTable<W: Write> {
    out: W,
}

impl ConsoleTable<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleTable<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for ConsoleTable<W> {
    fn emit(&mut self, layout: &RecordLayout, records: &[CourseAuditRecord]) -> OutputResult<()> {
        let headers = layout.headers();
        let rows: Vec<Vec<String>> = records.iter().map(|r| layout.values(r)).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(&mut self.out, &headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut self.out, &rule, &widths)?;
        for row in &rows {
            write_line(&mut self.out, row, &widths)?;
        }

        self.out.flush()?;
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(out, "| {} |", padded.join(" | "))
}
