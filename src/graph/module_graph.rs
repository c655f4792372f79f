//! Module graph implementation using petgraph.
//!
//! Nodes are canonical file paths; an edge from `a` to `b` carries every
//! import record in `a` that resolved to `b`.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::analysis::{ExportRecord, ImportKind, ImportRecord, Strategy};
use crate::resolve::Resolution;

/// Represents a node in the module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Canonical path of the module
    pub path: PathBuf,
    /// Extractor that read the file, `None` if the file was only seen as an
    /// import target (unreadable, outside the file list, or a directory)
    pub strategy: Option<Strategy>,
}

impl ModuleNode {
    /// Creates a node for a file that was only referenced.
    pub fn referenced(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            strategy: None,
        }
    }

    /// Returns true if the file's own facts were merged.
    pub fn is_analyzed(&self) -> bool {
        self.strategy.is_some()
    }
}

/// Represents an edge in the module graph.
///
/// Groups all import records between one importer and one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportEdge {
    pub imports: Vec<ImportRecord>,
}

impl ImportEdge {
    /// Returns true if every import on this edge is a dynamic `import()`.
    pub fn is_dynamic_only(&self) -> bool {
        !self.imports.is_empty() && self.imports.iter().all(|i| i.kind == ImportKind::Dynamic)
    }
}

/// An import record paired with where it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub record: ImportRecord,
    pub target: Resolution,
}

/// A frozen, read-only module graph.
///
/// Built with [`GraphBuilder`](super::GraphBuilder). Edges point from the
/// importing module to the imported module.
///
/// # Example
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use shakeguard::analysis::{FileFacts, ImportKind, ImportedName, Strategy};
/// use shakeguard::graph::{GraphBuilder, ModuleFacts};
/// use shakeguard::resolve::Resolution;
///
/// let mut a = FileFacts::new(Path::new("/app/a.ts"), Strategy::Syntax);
/// a.push_export("foo", 1);
///
/// let mut b = FileFacts::new(Path::new("/app/b.ts"), Strategy::Syntax);
/// b.push_import(ImportedName::Named("foo".into()), "./a", ImportKind::Static, 1);
///
/// let mut builder = GraphBuilder::new();
/// builder.add_module(ModuleFacts::resolve_with(a, |_| Resolution::External));
/// builder.add_module(ModuleFacts::resolve_with(b, |_| {
///     Resolution::Local(PathBuf::from("/app/a.ts"))
/// }));
/// let graph = builder.finish();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    /// The underlying directed graph
    pub(super) graph: DiGraph<ModuleNode, ImportEdge>,
    /// Maps module paths to their node indices for O(1) lookup
    pub(super) node_indices: HashMap<PathBuf, NodeIndex>,
    /// Named, default and namespace-target exports per file (first occurrence wins)
    pub(super) exports: HashMap<PathBuf, Vec<ExportRecord>>,
    /// `export * from` records per file
    pub(super) wildcards: HashMap<PathBuf, Vec<ExportRecord>>,
    /// Every import per file, including external ones
    pub(super) imports: HashMap<PathBuf, Vec<ResolvedImport>>,
}

impl ModuleGraph {
    /// Gets a node by path.
    ///
    /// # Arguments
    ///
    /// * `path` - Canonical module path
    ///
    /// # Returns
    ///
    /// `Some(&ModuleNode)` if found, `None` otherwise.
    pub fn get_node(&self, path: &Path) -> Option<&ModuleNode> {
        self.node_indices
            .get(path)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// All nodes, sorted by path.
    pub fn modules(&self) -> Vec<&ModuleNode> {
        let mut nodes: Vec<_> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// Exports of a file, excluding `export * from` records.
    pub fn exports_of(&self, path: &Path) -> &[ExportRecord] {
        self.exports.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `export * from` records of a file.
    pub fn wildcard_reexports_of(&self, path: &Path) -> &[ExportRecord] {
        self.wildcards.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every import declared by a file, with its resolution.
    pub fn imports_of(&self, path: &Path) -> &[ResolvedImport] {
        self.imports.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Import records in other files (or this one) that resolved to `path`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::{Path, PathBuf};
    /// use shakeguard::analysis::{FileFacts, ImportKind, ImportedName, Strategy};
    /// use shakeguard::graph::{GraphBuilder, ModuleFacts};
    /// use shakeguard::resolve::Resolution;
    ///
    /// let mut b = FileFacts::new(Path::new("/app/b.ts"), Strategy::Syntax);
    /// b.push_import(ImportedName::Default, "./a", ImportKind::Static, 3);
    ///
    /// let mut builder = GraphBuilder::new();
    /// builder.add_module(ModuleFacts::resolve_with(b, |_| {
    ///     Resolution::Local(PathBuf::from("/app/a.ts"))
    /// }));
    /// let graph = builder.finish();
    ///
    /// let incoming = graph.incoming_imports(Path::new("/app/a.ts"));
    /// assert_eq!(incoming.len(), 1);
    /// assert_eq!(incoming[0].imported, ImportedName::Default);
    /// ```
    pub fn incoming_imports(&self, path: &Path) -> Vec<&ImportRecord> {
        let Some(&idx) = self.node_indices.get(path) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Incoming)
            .flat_map(|edge| edge.weight().imports.iter())
            .collect()
    }

    /// Gets the modules a file imports (outgoing edges).
    pub fn dependencies(&self, path: &Path) -> Vec<&ModuleNode> {
        let Some(&idx) = self.node_indices.get(path) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .collect()
    }

    /// Gets the modules importing a file (incoming edges).
    pub fn dependents(&self, path: &Path) -> Vec<&ModuleNode> {
        let Some(&idx) = self.node_indices.get(path) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter_map(|edge| self.graph.node_weight(edge.source()))
            .collect()
    }

    /// Targets reachable through at least one non-dynamic import, sorted.
    ///
    /// These are the edges that take part in module evaluation order.
    pub fn static_dependencies(&self, path: &Path) -> Vec<&Path> {
        let Some(&idx) = self.node_indices.get(path) else {
            return Vec::new();
        };

        let mut targets: Vec<&Path> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| !edge.weight().is_dynamic_only())
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .map(|node| node.path.as_path())
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Checks if the graph contains any import cycle, dynamic edges included.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a node exists in the graph.
    pub fn contains(&self, path: &Path) -> bool {
        self.node_indices.contains_key(path)
    }
}
