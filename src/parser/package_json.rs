//! Parser for npm package.json files.
//!
//! This module reads a project's package.json so its published entry
//! points can be exempted from unused-export analysis.

use std::fs;
use std::path::Path;

use super::types::PackageJson;

/// Errors that can occur during package.json parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a package.json file from a file path.
///
/// # Arguments
///
/// * `path` - Path to the package.json file
///
/// # Returns
///
/// A `ParseResult` containing the parsed `PackageJson` or an error.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use shakeguard::parser::package_json::parse_file;
///
/// let pkg = parse_file(Path::new("package.json")).unwrap();
/// println!("Entry points: {:?}", pkg.entry_targets());
/// ```
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use shakeguard::parser::package_json::parse_str;
///
/// let json = r#"{"name": "my-app", "module": "src/index.ts"}"#;
/// let pkg = parse_str(json).unwrap();
/// assert_eq!(pkg.module, Some("src/index.ts".to_string()));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    let pkg: PackageJson = serde_json::from_str(content)?;
    Ok(pkg)
}

/// Reads `<root>/package.json` if it exists.
///
/// A missing file is `Ok(None)`; an unreadable or malformed one is an error.
pub fn find_in(root: &Path) -> ParseResult<Option<PackageJson>> {
    let path = root.join("package.json");
    if !path.is_file() {
        return Ok(None);
    }
    parse_file(&path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal() {
        let pkg = parse_str(r#"{"name": "test"}"#).unwrap();
        assert_eq!(pkg.name, Some("test".to_string()));
        assert!(pkg.main.is_none());
    }

    #[test]
    fn test_parse_ignores_unrelated_fields() {
        let json = r#"{
            "name": "app",
            "version": "1.0.0",
            "scripts": { "build": "tsc" },
            "dependencies": { "react": "^18.2.0" },
            "main": "lib/index.js"
        }"#;
        let pkg = parse_str(json).unwrap();
        assert_eq!(pkg.version, Some("1.0.0".to_string()));
        assert_eq!(pkg.entry_targets(), vec!["lib/index.js"]);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_str("{ not json");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn test_parse_wrong_field_type() {
        let result = parse_str(r#"{"main": 42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_find_in_missing() {
        let dir = TempDir::new().unwrap();
        assert!(find_in(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_find_in_present() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"module": "src/main.ts"}"#).unwrap();

        let pkg = find_in(dir.path()).unwrap().unwrap();
        assert_eq!(pkg.entry_targets(), vec!["src/main.ts"]);
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/definitely/not/package.json"));
        assert!(matches!(result, Err(ParseError::IoError(_))));
    }
}
