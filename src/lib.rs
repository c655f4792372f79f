//! Shakeguard - finds what defeats tree-shaking in JavaScript/TypeScript projects
//!
//! This crate extracts import/export facts from every source file, builds a
//! module graph from them, and reports exports nothing imports and import
//! cycles between modules.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use shakeguard::entry::EntryPoints;
//! use shakeguard::project::{analyze_project, discover_source_files};
//!
//! let root = Path::new("my-app");
//! let files = discover_source_files(root, &[]);
//! let entries = EntryPoints::with_default_names(root);
//! let report = analyze_project(root, &files, &entries)?;
//!
//! for finding in report.findings() {
//!     println!("{}: {}", finding.file, finding.message);
//! }
//! # Ok::<(), shakeguard::analysis::AnalysisError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod detect;
pub mod entry;
pub mod findings;
pub mod graph;
pub mod logging;
pub mod parser;
pub mod project;
pub mod report;
pub mod resolve;
