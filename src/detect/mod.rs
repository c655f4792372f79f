//! Analyses over a finished [`ModuleGraph`](crate::graph::ModuleGraph).
//!
//! Both detectors only read the graph and can run in any order.

pub mod cycles;
pub mod unused_exports;

pub use cycles::{find_cycles, CircularDependency};
pub use unused_exports::{find_unused_exports, UnusedExport};
