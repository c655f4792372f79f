//! Configuration loading from shakeguard.toml.
//!
//! Every field is optional; command-line flags override what the file sets.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::EntryPoints;
use crate::findings::Severity;
use crate::parser::PackageJson;
use crate::report::ReportFormat;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "shakeguard.toml";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main configuration structure for shakeguard.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ShakeguardConfig {
    /// Directory names to skip during discovery, on top of the built-in list.
    pub ignore: Vec<String>,
    /// Entry point configuration.
    pub entry: EntryConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Which modules count as the project's public surface.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EntryConfig {
    /// Entry files, relative to the project root.
    pub files: Vec<PathBuf>,
    /// File stems treated as entries; `index` and `main` when unset.
    pub names: Option<Vec<String>>,
    /// Read entry targets from package.json.
    pub package_json: bool,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            names: None,
            package_json: true,
        }
    }
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "markdown".
    pub format: Option<ReportFormat>,
    /// Findings below this severity are dropped.
    pub min_severity: Option<Severity>,
}

impl ShakeguardConfig {
    /// Build the entry predicate this configuration describes.
    ///
    /// `package_json` is only consulted when `[entry] package_json` is on.
    pub fn entry_points(&self, root: &Path, package_json: Option<&PackageJson>) -> EntryPoints {
        let mut entries = match &self.entry.names {
            Some(names) => {
                let mut entries = EntryPoints::new(root);
                for name in names {
                    entries.add_name(name);
                }
                entries
            }
            None => EntryPoints::with_default_names(root),
        };

        for file in &self.entry.files {
            entries.add_file(file);
        }
        if self.entry.package_json {
            if let Some(pkg) = package_json {
                entries.add_package_json(pkg);
            }
        }
        entries
    }
}

/// Loads configuration from `<root>/shakeguard.toml` if it exists.
pub fn load_config(root: &Path) -> ConfigResult<Option<ShakeguardConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit path.
pub fn load_config_file(path: &Path) -> ConfigResult<ShakeguardConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryPredicate;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
ignore = ["generated", "vendor"]

[entry]
files = ["src/cli.ts"]
names = ["app"]
package_json = false

[output]
format = "json"
min_severity = "high"
"#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.ignore, vec!["generated", "vendor"]);
        assert_eq!(config.entry.files, vec![PathBuf::from("src/cli.ts")]);
        assert!(!config.entry.package_json);
        assert_eq!(config.output.format, Some(ReportFormat::Json));
        assert_eq!(config.output.min_severity, Some(Severity::High));
    }

    #[test]
    fn test_defaults() {
        let config: ShakeguardConfig = toml::from_str("").unwrap();
        assert!(config.ignore.is_empty());
        assert!(config.entry.package_json);
        assert!(config.entry.names.is_none());
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "ignore = 3").unwrap();
        assert!(matches!(load_config(dir.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_entry_points_from_config() {
        let root = Path::new("/p");
        let config = ShakeguardConfig {
            entry: EntryConfig {
                names: Some(vec!["app".to_string()]),
                ..EntryConfig::default()
            },
            ..ShakeguardConfig::default()
        };
        let pkg = crate::parser::parse_str(r#"{"main": "dist/server.js"}"#).unwrap();
        let entries = config.entry_points(root, Some(&pkg));

        assert!(entries.is_entry(Path::new("/p/src/app.ts")));
        assert!(!entries.is_entry(Path::new("/p/src/index.ts")));
        assert!(entries.is_entry(Path::new("/p/src/server.ts")));
    }
}
