//! Parser module for shakeguard.
//!
//! Reads package manifests for the fields that name a project's public
//! entry modules.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use shakeguard::parser::package_json;
//!
//! if let Some(pkg) = package_json::find_in(Path::new("."))? {
//!     for target in pkg.entry_targets() {
//!         println!("entry: {target}");
//!     }
//! }
//! ```

pub mod package_json;
pub mod types;

// Re-export commonly used types for convenience
pub use package_json::{find_in, parse_file, parse_str, ParseError, ParseResult};

pub use types::PackageJson;
