//! Markdown report implementation.
//!
//! Writes findings in Markdown format for pull request comments and docs.

use super::{ReportData, Reporter};
use crate::findings::{Finding, FindingKind};
use std::io::{self, Write};

/// Markdown reporter implementation.
pub struct MarkdownReporter;

impl Reporter for MarkdownReporter {
    fn render<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Tree-Shaking Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Root:** `{}`", data.root)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Files Analyzed | {} |", data.summary.files_analyzed)?;
        writeln!(writer, "| Pattern Fallbacks | {} |", data.summary.pattern_fallbacks)?;
        if data.summary.skipped_files > 0 {
            writeln!(writer, "| Skipped Files | {} |", data.summary.skipped_files)?;
        }
        writeln!(writer, "| Modules | {} |", data.summary.modules)?;
        writeln!(writer, "| Import Edges | {} |", data.summary.edges)?;
        writeln!(writer, "| Unused Exports | {} |", data.unused_export_count())?;
        writeln!(writer, "| Circular Dependencies | {} |", data.cycle_count())?;
        writeln!(writer)?;

        if data.findings.is_empty() {
            writeln!(writer, "No findings.")?;
            return Ok(());
        }

        let cycles: Vec<&Finding> = data
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::CircularDependency)
            .collect();

        if !cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies ({})", cycles.len())?;
            writeln!(writer)?;
            for (i, cycle) in cycles.iter().enumerate() {
                writeln!(writer, "{}. **{}** {}", i + 1, cycle.severity, cycle.message)?;
                writeln!(writer, "   - {}", cycle.remediation)?;
            }
            writeln!(writer)?;
        }

        let unused: Vec<&Finding> = data
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::UnusedExport)
            .collect();

        if !unused.is_empty() {
            writeln!(writer, "## Unused Exports ({})", unused.len())?;
            writeln!(writer)?;
            writeln!(writer, "| File | Line | Export | Severity |")?;
            writeln!(writer, "|------|------|--------|----------|")?;
            for finding in &unused {
                writeln!(
                    writer,
                    "| {} | {} | {} | {} |",
                    finding.file,
                    finding.line.map(|l| l.to_string()).unwrap_or_default(),
                    escape_cell(&finding.message),
                    finding.severity
                )?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
