//! Report rendering for analysis results.
//!
//! This module provides reporters for writing prioritized findings in
//! various formats: plain text, JSON, and Markdown.

pub mod json;
pub mod markdown;
pub mod text;

use serde::Deserialize;
use std::io::{self, Write};

use crate::findings::{prioritize, Finding, FindingKind, Severity};
use crate::project::ProjectReport;

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain text - terminal output
    #[default]
    Text,
    /// JSON format - machine-readable, full data
    Json,
    /// Markdown format - pull request comments and docs
    #[serde(alias = "md")]
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!(
                "Unknown report format: '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Run statistics shown at the top of every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub files_analyzed: usize,
    pub pattern_fallbacks: usize,
    pub skipped_files: usize,
    pub modules: usize,
    pub edges: usize,
}

/// Data container for rendering.
///
/// Findings are already filtered and sorted most severe first.
#[derive(Debug, Clone)]
pub struct ReportData {
    /// Project root, for display
    pub root: String,
    pub summary: Summary,
    pub findings: Vec<Finding>,
}

impl ReportData {
    /// Build report data from an analysis run, keeping findings at or above `min`.
    pub fn new(report: &ProjectReport, min: Severity) -> Self {
        Self {
            root: report.root.display().to_string(),
            summary: Summary {
                files_analyzed: report.files_analyzed,
                pattern_fallbacks: report.pattern_fallbacks,
                skipped_files: report.skipped.len(),
                modules: report.graph.node_count(),
                edges: report.graph.edge_count(),
            },
            findings: prioritize(report.findings(), min),
        }
    }

    pub fn unused_export_count(&self) -> usize {
        self.count(FindingKind::UnusedExport)
    }

    pub fn cycle_count(&self) -> usize {
        self.count(FindingKind::CircularDependency)
    }

    /// Number of findings at exactly this severity.
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

/// Trait for reporters.
pub trait Reporter {
    /// Render the data to the given writer.
    fn render<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()>;
}

/// Render data in the specified format.
pub fn render<W: Write>(format: ReportFormat, data: &ReportData, writer: &mut W) -> io::Result<()> {
    match format {
        ReportFormat::Text => text::TextReporter.render(data, writer),
        ReportFormat::Json => json::JsonReporter.render(data, writer),
        ReportFormat::Markdown => markdown::MarkdownReporter.render(data, writer),
    }
}

/// Render data to a string.
pub fn render_to_string(format: ReportFormat, data: &ReportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    render(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
pub(crate) fn sample_data() -> ReportData {
    use crate::detect::{CircularDependency, UnusedExport};
    use std::path::{Path, PathBuf};

    let root = Path::new("/app");
    let unused = UnusedExport {
        file: PathBuf::from("/app/src/util.ts"),
        name: "helper".to_string(),
        line: 3,
    };
    let cycle = CircularDependency::new(vec![
        PathBuf::from("/app/src/a.ts"),
        PathBuf::from("/app/src/b.ts"),
        PathBuf::from("/app/src/c.ts"),
    ]);
    let findings = vec![
        Finding::unused_export(&unused, root),
        Finding::circular_dependency(&cycle, root),
    ];

    ReportData {
        root: "/app".to_string(),
        summary: Summary {
            files_analyzed: 4,
            pattern_fallbacks: 1,
            skipped_files: 0,
            modules: 4,
            edges: 3,
        },
        findings: prioritize(findings, Severity::Low),
    }
}
