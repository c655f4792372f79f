//! Exports nothing in the project imports.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::analysis::{ImportRecord, ImportedName};
use crate::entry::EntryPredicate;
use crate::graph::ModuleGraph;

/// An export no module consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedExport {
    pub file: PathBuf,
    pub name: String,
    /// Line number of the export (1-indexed)
    pub line: usize,
}

/// What importers take from one module.
#[derive(Debug, Default)]
struct ExportUsage<'a> {
    namespace: bool,
    default: bool,
    names: HashSet<&'a str>,
}

impl<'a> ExportUsage<'a> {
    fn collect(imports: &[&'a ImportRecord]) -> Self {
        let mut usage = Self::default();
        for &import in imports {
            match &import.imported {
                ImportedName::Namespace => usage.namespace = true,
                ImportedName::Default => usage.default = true,
                ImportedName::Named(name) => {
                    usage.names.insert(name.as_str());
                }
                ImportedName::SideEffect => {}
            }
        }
        usage
    }

    fn consumes(&self, name: &str) -> bool {
        self.namespace || self.names.contains(name) || (name == "default" && self.default)
    }
}

/// Find exports of non-entry files that no import consumes.
///
/// A namespace import (`import * as`, `export * from`, `require`, `import()`)
/// marks every export of its target used. Results are sorted by file, line
/// and name.
pub fn find_unused_exports(graph: &ModuleGraph, entry: &dyn EntryPredicate) -> Vec<UnusedExport> {
    let mut unused = Vec::new();

    for module in graph.modules() {
        let exports = graph.exports_of(&module.path);
        if exports.is_empty() || entry.is_entry(&module.path) {
            continue;
        }

        let incoming = graph.incoming_imports(&module.path);
        let usage = ExportUsage::collect(&incoming);

        unused.extend(
            exports
                .iter()
                .filter(|export| !usage.consumes(&export.name))
                .map(|export| UnusedExport {
                    file: module.path.clone(),
                    name: export.name.clone(),
                    line: export.line,
                }),
        );
    }

    unused.sort_by(|a, b| (&a.file, a.line, &a.name).cmp(&(&b.file, b.line, &b.name)));
    unused
}
