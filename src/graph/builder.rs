//! Accumulation phase of the module graph.

use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::module_graph::{ImportEdge, ModuleGraph, ModuleNode, ResolvedImport};
use crate::analysis::{ExportRecord, FileFacts, ImportRecord, Strategy};
use crate::resolve::{ModuleResolver, Resolution};

/// One file's contribution to the graph: its facts with every import
/// already resolved.
#[derive(Debug, Clone)]
pub struct ModuleFacts {
    pub path: PathBuf,
    pub strategy: Strategy,
    pub exports: Vec<ExportRecord>,
    pub imports: Vec<ResolvedImport>,
}

impl ModuleFacts {
    /// Resolve every import in `facts` against the filesystem.
    pub fn resolve(facts: FileFacts, resolver: &ModuleResolver) -> Self {
        let importer = facts.path.clone();
        Self::resolve_with(facts, |record| resolver.resolve(&importer, &record.source))
    }

    /// Resolve every import in `facts` with a custom function.
    pub fn resolve_with(
        facts: FileFacts,
        mut resolve: impl FnMut(&ImportRecord) -> Resolution,
    ) -> Self {
        let imports = facts
            .imports
            .into_iter()
            .map(|record| {
                let target = resolve(&record);
                ResolvedImport { record, target }
            })
            .collect();

        Self {
            path: facts.path,
            strategy: facts.strategy,
            exports: facts.exports,
            imports,
        }
    }
}

/// Builds a [`ModuleGraph`] one file at a time.
///
/// Each [`add_module`](Self::add_module) call merges one file atomically.
/// [`finish`](Self::finish) freezes the result; nothing can be added after.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ModuleGraph,
}

impl GraphBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one file's facts into the graph.
    ///
    /// The file's node is created (or upgraded from a referenced-only node),
    /// its exports recorded, and one edge per distinct local target created
    /// or extended with the matching import records.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::{Path, PathBuf};
    /// use shakeguard::analysis::{FileFacts, ImportKind, ImportedName, Strategy};
    /// use shakeguard::graph::{GraphBuilder, ModuleFacts};
    /// use shakeguard::resolve::Resolution;
    ///
    /// let mut x = FileFacts::new(Path::new("/app/x.ts"), Strategy::Syntax);
    /// x.push_import(ImportedName::Named("a".into()), "./y", ImportKind::Static, 1);
    /// x.push_import(ImportedName::Named("b".into()), "./y", ImportKind::Static, 2);
    /// x.push_import(ImportedName::Default, "react", ImportKind::Static, 3);
    ///
    /// let mut builder = GraphBuilder::new();
    /// builder.add_module(ModuleFacts::resolve_with(x, |record| {
    ///     if record.source == "react" {
    ///         Resolution::External
    ///     } else {
    ///         Resolution::Local(PathBuf::from("/app/y.ts"))
    ///     }
    /// }));
    /// let graph = builder.finish();
    ///
    /// // two records, one edge; the external import adds no node
    /// assert_eq!(graph.edge_count(), 1);
    /// assert_eq!(graph.node_count(), 2);
    /// assert_eq!(graph.imports_of(Path::new("/app/x.ts")).len(), 3);
    /// ```
    pub fn add_module(&mut self, module: ModuleFacts) {
        let from = self.ensure_node(&module.path);
        if let Some(node) = self.graph.graph.node_weight_mut(from) {
            node.strategy = Some(module.strategy);
        }

        let exports = self.graph.exports.entry(module.path.clone()).or_default();
        let mut seen: HashSet<String> = exports.iter().map(|e| e.name.clone()).collect();
        for export in module.exports {
            if export.is_wildcard() {
                self.graph
                    .wildcards
                    .entry(module.path.clone())
                    .or_default()
                    .push(export);
            } else if seen.insert(export.name.clone()) {
                exports.push(export);
            }
        }

        for resolved in &module.imports {
            let Resolution::Local(target) = &resolved.target else {
                continue;
            };
            let to = self.ensure_node(target);
            match self.graph.graph.find_edge(from, to) {
                Some(edge) => {
                    if let Some(weight) = self.graph.graph.edge_weight_mut(edge) {
                        weight.imports.push(resolved.record.clone());
                    }
                }
                None => {
                    self.graph.graph.add_edge(
                        from,
                        to,
                        ImportEdge {
                            imports: vec![resolved.record.clone()],
                        },
                    );
                }
            }
        }

        self.graph
            .imports
            .entry(module.path)
            .or_default()
            .extend(module.imports);
    }

    /// Freezes the graph.
    pub fn finish(self) -> ModuleGraph {
        self.graph
    }

    fn ensure_node(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.graph.node_indices.get(path) {
            return idx;
        }

        let idx = self.graph.graph.add_node(ModuleNode::referenced(path));
        self.graph.node_indices.insert(path.to_path_buf(), idx);
        idx
    }
}
