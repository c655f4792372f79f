//! JSON report implementation.
//!
//! Writes findings in JSON format for CI pipelines and other tools.

use super::{ReportData, Reporter};
use crate::findings::{Finding, Severity};
use serde::Serialize;
use std::io::{self, Write};

/// JSON reporter implementation.
pub struct JsonReporter;

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    files_analyzed: usize,
    pattern_fallbacks: usize,
    skipped_files: usize,
    modules: usize,
    edges: usize,
    unused_exports: usize,
    circular_dependencies: usize,
    by_severity: JsonSeverityCounts,
}

#[derive(Serialize)]
struct JsonSeverityCounts {
    critical: usize,
    high: usize,
    medium: usize,
    low: usize,
}

/// Root JSON report structure.
#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a str,
    summary: JsonSummary,
    findings: &'a [Finding],
}

impl Reporter for JsonReporter {
    fn render<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        let report = JsonReport {
            root: &data.root,
            summary: JsonSummary {
                files_analyzed: data.summary.files_analyzed,
                pattern_fallbacks: data.summary.pattern_fallbacks,
                skipped_files: data.summary.skipped_files,
                modules: data.summary.modules,
                edges: data.summary.edges,
                unused_exports: data.unused_export_count(),
                circular_dependencies: data.cycle_count(),
                by_severity: JsonSeverityCounts {
                    critical: data.severity_count(Severity::Critical),
                    high: data.severity_count(Severity::High),
                    medium: data.severity_count(Severity::Medium),
                    low: data.severity_count(Severity::Low),
                },
            },
            findings: &data.findings,
        };

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
