//! Plain text report for the terminal.

use super::{ReportData, Reporter};
use std::io::{self, Write};

/// Text reporter implementation.
pub struct TextReporter;

impl Reporter for TextReporter {
    fn render<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        let summary = &data.summary;
        writeln!(
            writer,
            "Analyzed {} files ({} modules, {} edges) under {}",
            summary.files_analyzed, summary.modules, summary.edges, data.root
        )?;
        if summary.pattern_fallbacks > 0 {
            writeln!(
                writer,
                "  {} files used the pattern fallback",
                summary.pattern_fallbacks
            )?;
        }
        if summary.skipped_files > 0 {
            writeln!(writer, "  {} files could not be read", summary.skipped_files)?;
        }
        writeln!(writer)?;

        if data.findings.is_empty() {
            writeln!(writer, "No findings.")?;
            return Ok(());
        }

        for finding in &data.findings {
            let location = match finding.line {
                Some(line) => format!("{}:{}", finding.file, line),
                None => finding.file.clone(),
            };
            writeln!(
                writer,
                "[{}] {} {}",
                finding.severity.to_string().to_uppercase(),
                location,
                finding.message
            )?;
            writeln!(writer, "    fix: {}", finding.remediation)?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "{} unused exports, {} circular dependencies",
            data.unused_export_count(),
            data.cycle_count()
        )
    }
}
