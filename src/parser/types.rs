//! Shared types for manifest parsing.
//!
//! Only the package.json fields that name entry modules are modeled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents the entry-related fields of a package.json file.
///
/// `browser`, `bin` and `exports` take several shapes in the wild (a string,
/// a map, nested condition maps), so they are kept as raw JSON values.
///
/// # Example
///
/// ```
/// use shakeguard::parser::types::PackageJson;
///
/// let json = r#"{"name": "my-lib", "main": "dist/index.js"}"#;
/// let pkg: PackageJson = serde_json::from_str(json).unwrap();
/// assert_eq!(pkg.name, Some("my-lib".to_string()));
/// assert_eq!(pkg.entry_targets(), vec!["dist/index.js"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    /// The name of the package.
    pub name: Option<String>,

    /// The version of the package (semver format).
    pub version: Option<String>,

    /// CommonJS entry point.
    pub main: Option<String>,

    /// ES module entry point used by bundlers.
    pub module: Option<String>,

    /// Type declarations entry.
    #[serde(alias = "typings")]
    pub types: Option<String>,

    /// Browser entry, or a map of file replacements.
    pub browser: Option<Value>,

    /// Executable(s) shipped by the package.
    pub bin: Option<Value>,

    /// Conditional exports map.
    pub exports: Option<Value>,
}

impl PackageJson {
    /// All module paths this manifest exposes, in field order, deduplicated.
    ///
    /// Nested `exports` conditions are flattened; `false` and `null`
    /// entries are skipped.
    pub fn entry_targets(&self) -> Vec<String> {
        let mut targets = Vec::new();

        for field in [&self.main, &self.module, &self.types].into_iter().flatten() {
            targets.push(field.clone());
        }
        for value in [&self.browser, &self.bin, &self.exports].into_iter().flatten() {
            collect_strings(value, &mut targets);
        }

        let mut seen = std::collections::HashSet::new();
        targets.retain(|t| seen.insert(t.clone()));
        targets
    }

    /// Returns true if any entry field is set.
    pub fn has_entry_fields(&self) -> bool {
        !self.entry_targets().is_empty()
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
