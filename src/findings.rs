//! Prioritized findings with remediation hints.
//!
//! The detectors return typed results; this module turns them into the
//! uniform [`Finding`] shape the reports render.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;

use crate::detect::{CircularDependency, UnusedExport};

/// How much a finding hurts tree-shaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Unknown severity: '{}'. Valid values: low, medium, high, critical",
                s
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Which detector produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    UnusedExport,
    CircularDependency,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingKind::UnusedExport => write!(f, "unused-export"),
            FindingKind::CircularDependency => write!(f, "circular-dependency"),
        }
    }
}

/// A single reportable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    /// Root-relative file the finding is anchored to
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    pub remediation: String,
    /// Root-relative cycle members, in cycle order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Number of modules in the cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl Finding {
    pub fn unused_export(unused: &UnusedExport, root: &Path) -> Self {
        let file = relative_display(root, &unused.file);
        let message = if unused.name == "default" {
            "Default export is never imported".to_string()
        } else {
            format!("Export '{}' is never imported", unused.name)
        };
        Self {
            kind: FindingKind::UnusedExport,
            severity: Severity::Low,
            file,
            line: Some(unused.line),
            message,
            remediation: format!(
                "Remove the export keyword from '{}', or delete it if nothing in the file uses it",
                unused.name
            ),
            members: Vec::new(),
            length: None,
        }
    }

    pub fn circular_dependency(cycle: &CircularDependency, root: &Path) -> Self {
        let members: Vec<String> = cycle
            .members
            .iter()
            .map(|m| relative_display(root, m))
            .collect();
        let mut path = members.join(" -> ");
        if let Some(first) = members.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        Self {
            kind: FindingKind::CircularDependency,
            severity: cycle.severity,
            file: members.first().cloned().unwrap_or_default(),
            line: None,
            message: format!("Circular dependency of {} modules: {}", cycle.len(), path),
            remediation: "Move the shared code into a module that the cycle members import, so no module imports one that imports it back".to_string(),
            length: Some(members.len()),
            members,
        }
    }
}

/// Keep findings at or above `min`, most severe first.
pub fn prioritize(findings: Vec<Finding>, min: Severity) -> Vec<Finding> {
    let mut kept: Vec<Finding> = findings
        .into_iter()
        .filter(|f| f.severity >= min)
        .collect();
    kept.sort_by(|a, b| {
        (Reverse(a.severity), &a.file, a.line).cmp(&(Reverse(b.severity), &b.file, b.line))
    });
    kept
}

/// Path relative to `root` when possible, for display.
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unused(file: &str, name: &str, line: usize) -> UnusedExport {
        UnusedExport {
            file: PathBuf::from(file),
            name: name.to_string(),
            line,
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::default(), Severity::Low);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("severe".parse::<Severity>().is_err());
        assert_eq!(format!("{}", Severity::Medium), "medium");
    }

    #[test]
    fn test_unused_export_finding() {
        let finding = Finding::unused_export(&unused("/app/src/c.ts", "bar", 4), Path::new("/app"));
        assert_eq!(finding.kind, FindingKind::UnusedExport);
        assert_eq!(finding.severity, Severity::Low);
        assert_eq!(finding.file, "src/c.ts");
        assert_eq!(finding.line, Some(4));
        assert_eq!(finding.length, None);
        assert!(finding.message.contains("bar"));
    }

    #[test]
    fn test_cycle_finding() {
        let cycle = CircularDependency::new(vec![
            PathBuf::from("/app/x.ts"),
            PathBuf::from("/app/y.ts"),
        ]);
        let finding = Finding::circular_dependency(&cycle, Path::new("/app"));

        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.members, vec!["x.ts", "y.ts"]);
        assert!(finding.message.ends_with("x.ts -> y.ts -> x.ts"));
        assert_eq!(finding.line, None);
        assert_eq!(finding.length, Some(2));
    }

    #[test]
    fn test_prioritize_filters_and_sorts() {
        let root = Path::new("/app");
        let cycle = CircularDependency::new(vec![
            PathBuf::from("/app/a.ts"),
            PathBuf::from("/app/b.ts"),
            PathBuf::from("/app/c.ts"),
        ]);
        let findings = vec![
            Finding::unused_export(&unused("/app/z.ts", "z", 1), root),
            Finding::circular_dependency(&cycle, root),
            Finding::unused_export(&unused("/app/a.ts", "a", 2), root),
        ];

        let all = prioritize(findings.clone(), Severity::Low);
        assert_eq!(all[0].kind, FindingKind::CircularDependency);
        assert_eq!(all[1].file, "a.ts");
        assert_eq!(all[2].file, "z.ts");

        let severe = prioritize(findings, Severity::High);
        assert_eq!(severe.len(), 1);
        assert_eq!(severe[0].severity, Severity::Critical);
    }

    #[test]
    fn test_json_shape() {
        let finding = Finding::unused_export(&unused("/app/a.ts", "a", 2), Path::new("/app"));
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["kind"], "unused-export");
        assert_eq!(value["severity"], "low");
        assert!(value.get("members").is_none());
    }
}
