//! Graph module for module dependency modeling.
//!
//! [`GraphBuilder`] accumulates one file at a time; [`GraphBuilder::finish`]
//! hands back a read-only [`ModuleGraph`] for the detectors.
//!
//! # Example
//!
//! ```rust
//! use std::path::{Path, PathBuf};
//! use shakeguard::analysis::{FileFacts, ImportKind, ImportedName, Strategy};
//! use shakeguard::graph::{GraphBuilder, ModuleFacts};
//! use shakeguard::resolve::Resolution;
//!
//! let mut app = FileFacts::new(Path::new("/app/index.ts"), Strategy::Syntax);
//! app.push_import(ImportedName::Namespace, "./util", ImportKind::Static, 1);
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_module(ModuleFacts::resolve_with(app, |_| {
//!     Resolution::Local(PathBuf::from("/app/util.ts"))
//! }));
//! let graph = builder.finish();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod builder;
mod module_graph;

pub use builder::{GraphBuilder, ModuleFacts};
pub use module_graph::{ImportEdge, ModuleGraph, ModuleNode, ResolvedImport};
