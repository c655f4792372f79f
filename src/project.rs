//! Project-level driver: discovery, the per-file pipeline and the report.
//!
//! Each file goes read -> normalize -> extract -> resolve on a rayon worker.
//! Results are merged into the graph in input order on the calling thread,
//! and the detectors run once the graph is frozen.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::analysis::{AnalysisError, AnalysisResult, ModuleAnalyzer, SourceLanguage, Strategy};
use crate::detect::{find_cycles, find_unused_exports, CircularDependency, UnusedExport};
use crate::entry::EntryPredicate;
use crate::findings::Finding;
use crate::graph::{GraphBuilder, ModuleFacts, ModuleGraph};
use crate::resolve::{canonical, ModuleResolver};

/// Directories never descended into during discovery.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    ".turbo",
];

/// Find all JavaScript/TypeScript sources under `root`, sorted.
///
/// Skips [`IGNORED_DIRS`], any directory named in `extra_ignore`, and
/// declaration files (`.d.ts`).
pub fn discover_source_files(root: &Path, extra_ignore: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e, extra_ignore))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_source_file(path))
        .collect();

    files.sort();
    files
}

/// Check if a directory should be skipped during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, extra_ignore: &[String]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    IGNORED_DIRS.contains(&name.as_ref()) || extra_ignore.iter().any(|i| i == name.as_ref())
}

fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
        return false;
    }
    SourceLanguage::from_path(path).is_some()
}

/// Everything one analysis run produced.
#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Canonical project root
    pub root: PathBuf,
    /// Files whose facts made it into the graph
    pub files_analyzed: usize,
    /// How many of those needed the pattern fallback
    pub pattern_fallbacks: usize,
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
    pub unused_exports: Vec<UnusedExport>,
    pub cycles: Vec<CircularDependency>,
    pub graph: ModuleGraph,
}

impl ProjectReport {
    /// All findings, root-relative, in detector order.
    pub fn findings(&self) -> Vec<Finding> {
        self.unused_exports
            .iter()
            .map(|u| Finding::unused_export(u, &self.root))
            .chain(
                self.cycles
                    .iter()
                    .map(|c| Finding::circular_dependency(c, &self.root)),
            )
            .collect()
    }
}

/// Per-file pipeline result.
enum FileOutcome {
    Merged(ModuleFacts),
    Skipped(PathBuf),
}

/// Analyze `files` (absolute, or relative to `root`) with the default resolver.
pub fn analyze_project(
    root: &Path,
    files: &[PathBuf],
    entry: &dyn EntryPredicate,
) -> AnalysisResult<ProjectReport> {
    analyze_project_with(root, files, entry, &ModuleResolver::default())
}

/// Analyze `files` with a specific resolver.
///
/// The only error is an invalid root or a grammar that fails to load;
/// unreadable files are logged and listed in [`ProjectReport::skipped`].
pub fn analyze_project_with(
    root: &Path,
    files: &[PathBuf],
    entry: &dyn EntryPredicate,
    resolver: &ModuleResolver,
) -> AnalysisResult<ProjectReport> {
    if !root.is_dir() {
        return Err(AnalysisError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    let root = canonical(root);

    // Fail fast on grammar problems instead of skipping every file.
    ModuleAnalyzer::new()?;

    let mut seen = HashSet::new();
    let files: Vec<PathBuf> = files
        .iter()
        .map(|f| {
            if f.is_absolute() {
                canonical(f)
            } else {
                canonical(&root.join(f))
            }
        })
        .filter(|f| seen.insert(f.clone()))
        .collect();

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map_init(
            || ModuleAnalyzer::new().ok(),
            |analyzer, path| process_file(analyzer.as_mut(), path, resolver),
        )
        .collect();

    let mut builder = GraphBuilder::new();
    let mut files_analyzed = 0;
    let mut pattern_fallbacks = 0;
    let mut skipped = Vec::new();

    for outcome in outcomes {
        match outcome {
            FileOutcome::Merged(module) => {
                files_analyzed += 1;
                if module.strategy == Strategy::Pattern {
                    pattern_fallbacks += 1;
                }
                builder.add_module(module);
            }
            FileOutcome::Skipped(path) => skipped.push(path),
        }
    }

    let graph = builder.finish();
    let unused_exports = find_unused_exports(&graph, entry);
    let cycles = find_cycles(&graph);

    info!(
        files = files_analyzed,
        fallbacks = pattern_fallbacks,
        skipped = skipped.len(),
        modules = graph.node_count(),
        edges = graph.edge_count(),
        unused_exports = unused_exports.len(),
        cycles = cycles.len(),
        "analysis complete"
    );

    Ok(ProjectReport {
        root,
        files_analyzed,
        pattern_fallbacks,
        skipped,
        unused_exports,
        cycles,
        graph,
    })
}

fn process_file(
    analyzer: Option<&mut ModuleAnalyzer>,
    path: &Path,
    resolver: &ModuleResolver,
) -> FileOutcome {
    let Some(analyzer) = analyzer else {
        warn!(path = %path.display(), "no analyzer available on this worker");
        return FileOutcome::Skipped(path.to_path_buf());
    };

    match analyzer.analyze_file(path) {
        Ok(facts) => {
            debug!(
                path = %path.display(),
                strategy = ?facts.strategy,
                exports = facts.exports.len(),
                imports = facts.imports.len(),
                "extracted"
            );
            FileOutcome::Merged(ModuleFacts::resolve(facts, resolver))
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable file");
            FileOutcome::Skipped(path.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{FindingKind, Severity};
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, content).unwrap();
        }
        temp
    }

    fn analyze(temp: &TempDir) -> ProjectReport {
        let files = discover_source_files(temp.path(), &[]);
        analyze_project(temp.path(), &files, &|_: &Path| false).unwrap()
    }

    fn unused_names(report: &ProjectReport) -> Vec<(String, String)> {
        report
            .unused_exports
            .iter()
            .map(|u| {
                (
                    u.file.file_name().unwrap().to_string_lossy().into_owned(),
                    u.name.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_named_import_scenario() {
        let temp = project(&[
            ("a.ts", "export const foo = 1;\n"),
            ("b.ts", "import { foo } from './a';\nconsole.log(foo);\n"),
            ("c.ts", "export const bar = 2;\n"),
        ]);
        let report = analyze(&temp);

        assert_eq!(unused_names(&report), vec![("c.ts".to_string(), "bar".to_string())]);
        assert!(report.cycles.is_empty());
        assert_eq!(report.files_analyzed, 3);
    }

    #[test]
    fn test_mutual_import_scenario() {
        let temp = project(&[
            ("x.ts", "import { y } from './y';\nexport const x = () => y;\n"),
            ("y.ts", "import { x } from './x';\nexport const y = () => x;\n"),
        ]);
        let report = analyze(&temp);

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].severity, Severity::High);
        let findings = report.findings();
        let cycle = findings
            .iter()
            .find(|f| f.kind == FindingKind::CircularDependency)
            .unwrap();
        assert_eq!(cycle.members, vec!["x.ts", "y.ts"]);
    }

    #[test]
    fn test_reexport_through_barrel() {
        let temp = project(&[
            ("src/button.tsx", "export const Button = () => null;\nexport const unused = 1;\n"),
            ("src/index.ts", "export { Button } from './button';\n"),
            ("src/app.ts", "import { Button } from '.';\nButton();\n"),
        ]);
        let report = analyze(&temp);

        assert_eq!(
            unused_names(&report),
            vec![("button.tsx".to_string(), "unused".to_string())]
        );
    }

    #[test]
    fn test_different_specifiers_share_one_node() {
        let temp = project(&[
            ("lib/shared.ts", "export const s = 1;\n"),
            ("lib/a.ts", "import { s } from './shared';\n"),
            ("b.ts", "import { s } from './lib/shared.ts';\n"),
        ]);
        let report = analyze(&temp);

        let shared = canonical(&temp.path().join("lib/shared.ts"));
        assert_eq!(report.graph.dependents(&shared).len(), 2);
        assert_eq!(report.graph.node_count(), 3);
    }

    #[test]
    fn test_unparseable_file_uses_fallback() {
        let temp = project(&[
            ("broken.js", "// export const ghost = 1;\nexport const kept = 1;\nfunction (\n"),
            ("user.js", "import { kept } from './broken';\n"),
        ]);
        let report = analyze(&temp);

        assert_eq!(report.pattern_fallbacks, 1);
        assert!(report.unused_exports.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = project(&[("ok.ts", "import './bad';\nexport const ok = 1;\n")]);
        fs::write(temp.path().join("bad.ts"), [0xff, 0xfe, 0xfd]).unwrap();
        let report = analyze(&temp);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.files_analyzed, 1);
        // the import still points at the unread node
        let bad = canonical(&temp.path().join("bad.ts"));
        assert!(report.graph.contains(&bad));
        assert!(!report.graph.get_node(&bad).unwrap().is_analyzed());
    }

    #[test]
    fn test_missing_listed_file_is_skipped() {
        let temp = project(&[("a.ts", "export const a = 1;\n")]);
        let files = vec![PathBuf::from("a.ts"), PathBuf::from("gone.ts")];
        let report = analyze_project(temp.path(), &files, &|_: &Path| false).unwrap();

        assert_eq!(report.files_analyzed, 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_entry_predicate_exempts_files() {
        let temp = project(&[("index.ts", "export const api = 1;\n")]);
        let files = discover_source_files(temp.path(), &[]);
        let is_index = |p: &Path| p.ends_with("index.ts");
        let report = analyze_project(temp.path(), &files, &is_index).unwrap();

        assert!(report.unused_exports.is_empty());
    }

    #[test]
    fn test_invalid_root() {
        let result = analyze_project(Path::new("/definitely/not/a/root"), &[], &|_: &Path| false);
        assert!(matches!(result, Err(AnalysisError::InvalidRoot { .. })));

        let temp = project(&[("file.ts", "")]);
        let result = analyze_project(&temp.path().join("file.ts"), &[], &|_: &Path| false);
        assert!(matches!(result, Err(AnalysisError::InvalidRoot { .. })));
    }

    #[test]
    fn test_discovery_filters() {
        let temp = project(&[
            ("src/a.ts", ""),
            ("src/b.jsx", ""),
            ("src/types.d.ts", ""),
            ("src/style.css", ""),
            ("node_modules/pkg/index.js", ""),
            ("dist/out.js", ""),
            ("generated/gen.ts", ""),
        ]);
        let files = discover_source_files(temp.path(), &["generated".to_string()]);
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(names, vec![PathBuf::from("src/a.ts"), PathBuf::from("src/b.jsx")]);
    }

    #[test]
    fn test_discovery_root_named_like_ignored_dir() {
        let temp = project(&[("build/src/a.ts", "")]);
        let files = discover_source_files(&temp.path().join("build"), &[]);
        assert_eq!(files.len(), 1);
    }
}
