//! Module resolution: import specifier + importing file -> project file.
//!
//! Only relative specifiers are resolved. Bare package names and anything
//! else that does not start with a relative marker are [`Resolution::External`].

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::debug;

/// Extension probe order for extensionless specifiers and index files.
pub const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Compiled-output extensions and the source extensions they usually come from.
pub const COMPILED_SOURCES: &[(&str, &[&str])] = &[
    ("js", &["ts", "tsx"]),
    ("jsx", &["tsx"]),
    ("mjs", &["mts"]),
    ("cjs", &["cts"]),
];

/// Where an import specifier points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A canonical path inside the analyzed tree
    Local(PathBuf),
    /// Package import or unresolvable path
    External,
}

impl Resolution {
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Resolution::Local(path) => Some(path),
            Resolution::External => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Resolution::External)
    }
}

/// Lookup tables the resolver probes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverTables {
    /// Extensions in priority order
    pub extensions: Vec<String>,
    /// Compiled extension -> source extensions, in priority order
    pub compiled_sources: Vec<(String, Vec<String>)>,
}

impl Default for ResolverTables {
    fn default() -> Self {
        Self {
            extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            compiled_sources: COMPILED_SOURCES
                .iter()
                .map(|(compiled, sources)| {
                    (
                        compiled.to_string(),
                        sources.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl ResolverTables {
    /// Source extensions a compiled extension maps back to.
    pub fn sources_for(&self, compiled: &str) -> &[String] {
        self.compiled_sources
            .iter()
            .find(|(ext, _)| ext == compiled)
            .map(|(_, sources)| sources.as_slice())
            .unwrap_or(&[])
    }
}

/// Resolves relative specifiers against the filesystem.
///
/// Resolution only queries file existence and type, so the result is a
/// pure function of (importer, specifier, filesystem state).
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    tables: ResolverTables,
}

impl ModuleResolver {
    pub fn new(tables: ResolverTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ResolverTables {
        &self.tables
    }

    /// Resolve `specifier` as written in `importer`.
    ///
    /// # Arguments
    ///
    /// * `importer` - Absolute path of the file containing the import
    /// * `specifier` - The module specifier string (e.g. `"./utils"`)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let resolver = ModuleResolver::default();
    /// let target = resolver.resolve(Path::new("/app/src/index.ts"), "./utils");
    /// // Resolution::Local("/app/src/utils.ts") when that file exists
    /// ```
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Resolution {
        if !is_relative(specifier) {
            return Resolution::External;
        }

        let base = importer.parent().unwrap_or(Path::new(""));
        let candidate = base.join(specifier).clean();

        if candidate.is_file() {
            return Resolution::Local(canonical(&candidate));
        }

        if candidate.is_dir() {
            if let Some(index) = self.try_index_files(&candidate) {
                return Resolution::Local(canonical(&index));
            }
            debug!(
                importer = %importer.display(),
                specifier,
                "directory without index file, keeping directory as target"
            );
            return Resolution::Local(canonical(&candidate));
        }

        if let Some(found) = self.try_extensions(&candidate) {
            return Resolution::Local(canonical(&found));
        }

        if let Some(found) = self.try_source_for_compiled(&candidate) {
            return Resolution::Local(canonical(&found));
        }

        Resolution::External
    }

    /// Try `candidate.<ext>` for each extension.
    fn try_extensions(&self, candidate: &Path) -> Option<PathBuf> {
        self.tables
            .extensions
            .iter()
            .map(|ext| append_extension(candidate, ext))
            .find(|path| path.is_file())
    }

    /// Try `dir/index.<ext>` for each extension.
    fn try_index_files(&self, dir: &Path) -> Option<PathBuf> {
        self.tables
            .extensions
            .iter()
            .map(|ext| dir.join(format!("index.{ext}")))
            .find(|path| path.is_file())
    }

    /// Map `foo.js` to `foo.ts`/`foo.tsx` and friends.
    fn try_source_for_compiled(&self, candidate: &Path) -> Option<PathBuf> {
        let ext = candidate.extension()?.to_str()?;
        self.tables
            .sources_for(ext)
            .iter()
            .map(|source_ext| candidate.with_extension(source_ext))
            .find(|path| path.is_file())
    }
}

/// Returns true for `.`, `..`, `./...` and `../...`.
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Canonical node key for a path, falling back to lexical cleaning.
pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        temp
    }

    fn local(temp: &TempDir, file: &str) -> Resolution {
        Resolution::Local(canonical(&temp.path().join(file)))
    }

    #[test]
    fn test_bare_specifier_is_external() {
        let resolver = ModuleResolver::default();
        let importer = Path::new("/app/src/index.ts");
        assert_eq!(resolver.resolve(importer, "react"), Resolution::External);
        assert_eq!(resolver.resolve(importer, "@scope/pkg"), Resolution::External);
        assert_eq!(resolver.resolve(importer, "/abs/path"), Resolution::External);
        assert_eq!(resolver.resolve(importer, ".hidden"), Resolution::External);
    }

    #[test]
    fn test_literal_file() {
        let temp = project(&["src/index.ts", "src/data.json"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&importer, "./data.json"),
            local(&temp, "src/data.json")
        );
    }

    #[test]
    fn test_extension_priority() {
        let temp = project(&["src/index.ts", "src/utils.js", "src/utils.ts"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&importer, "./utils"),
            local(&temp, "src/utils.ts")
        );
    }

    #[test]
    fn test_extension_is_appended_not_replaced() {
        let temp = project(&["src/index.ts", "src/app.config.ts"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&importer, "./app.config"),
            local(&temp, "src/app.config.ts")
        );
    }

    #[test]
    fn test_directory_index() {
        let temp = project(&["src/index.ts", "src/components/index.tsx"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&importer, "./components"),
            local(&temp, "src/components/index.tsx")
        );
        assert_eq!(
            resolver.resolve(&temp.path().join("src/components/index.tsx"), ".."),
            local(&temp, "src/index.ts")
        );
    }

    #[test]
    fn test_directory_without_index_is_degraded() {
        let temp = project(&["src/index.ts", "src/assets/logo.svg"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&importer, "./assets"),
            local(&temp, "src/assets")
        );
    }

    #[test]
    fn test_compiled_extension_maps_to_source() {
        let temp = project(&["src/index.ts", "src/utils.ts", "src/view.tsx", "src/esm.mts"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(resolver.resolve(&importer, "./utils.js"), local(&temp, "src/utils.ts"));
        assert_eq!(resolver.resolve(&importer, "./view.jsx"), local(&temp, "src/view.tsx"));
        assert_eq!(resolver.resolve(&importer, "./esm.mjs"), local(&temp, "src/esm.mts"));
    }

    #[test]
    fn test_missing_relative_is_external() {
        let temp = project(&["src/index.ts"]);
        let resolver = ModuleResolver::default();
        let importer = temp.path().join("src/index.ts");

        assert_eq!(resolver.resolve(&importer, "./nope"), Resolution::External);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let temp = project(&["src/a/index.ts", "src/b.ts", "src/lib/shared.ts"]);
        let resolver = ModuleResolver::default();
        let from_a = temp.path().join("src/a/index.ts");
        let from_b = temp.path().join("src/b.ts");

        let first = resolver.resolve(&from_a, "../lib/shared");
        let second = resolver.resolve(&from_a, "../lib/shared");
        assert_eq!(first, second);

        // different specifiers, same file, same node key
        let via_b = resolver.resolve(&from_b, "./lib/./shared.ts");
        assert_eq!(first, via_b);
    }

    #[test]
    fn test_custom_tables() {
        let temp = project(&["src/index.ts", "src/widget.vue"]);
        let tables = ResolverTables {
            extensions: vec!["vue".to_string()],
            compiled_sources: Vec::new(),
        };
        let resolver = ModuleResolver::new(tables);
        let importer = temp.path().join("src/index.ts");

        assert_eq!(resolver.resolve(&importer, "./widget"), local(&temp, "src/widget.vue"));
        assert!(resolver.tables().sources_for("js").is_empty());
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("."));
        assert!(is_relative(".."));
        assert!(is_relative("./a"));
        assert!(is_relative("../a"));
        assert!(!is_relative("a"));
        assert!(!is_relative(".a"));
    }
}
