//! Entry-point predicates.
//!
//! Entry modules are the public surface of a project: their exports are
//! consumed from outside the analyzed tree, so the unused-export detector
//! skips them.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::parser::PackageJson;
use crate::resolve::canonical;

/// Default file stems treated as entry points.
pub const DEFAULT_ENTRY_NAMES: &[&str] = &["index", "main"];

/// Output directories a compiled package.json target may live in.
const BUILD_DIRS: &[&str] = &["dist", "build", "lib", "out", "esm", "cjs"];

/// Decides whether a module is an entry point.
///
/// Implemented for any `Fn(&Path) -> bool`, so tests and embedders can pass
/// a closure.
pub trait EntryPredicate {
    fn is_entry(&self, path: &Path) -> bool;
}

impl<F> EntryPredicate for F
where
    F: Fn(&Path) -> bool,
{
    fn is_entry(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Entry points collected from explicit files, file stems and package.json.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use shakeguard::entry::{EntryPoints, EntryPredicate};
///
/// let mut entries = EntryPoints::new(Path::new("/app"));
/// entries.add_name("main");
///
/// assert!(entries.is_entry(Path::new("/app/src/main.ts")));
/// assert!(!entries.is_entry(Path::new("/app/src/util.ts")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryPoints {
    root: PathBuf,
    files: HashSet<PathBuf>,
    names: HashSet<String>,
    /// Root-relative module paths without extension
    modules: HashSet<PathBuf>,
}

impl EntryPoints {
    /// An empty set of entry points for the project at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Entry points with the default stems (`index`, `main`).
    pub fn with_default_names(root: &Path) -> Self {
        let mut entries = Self::new(root);
        for name in DEFAULT_ENTRY_NAMES {
            entries.add_name(name);
        }
        entries
    }

    /// Mark one file as an entry. Relative paths are taken from the root.
    pub fn add_file(&mut self, path: &Path) {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        self.files.insert(canonical(&absolute));
    }

    /// Mark every file with this stem (e.g. `index`) as an entry.
    pub fn add_name(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Add every target the manifest exposes.
    ///
    /// Compiled targets also match their likely source: `dist/index.js`
    /// accepts `dist/index.*` and `src/index.*`.
    pub fn add_package_json(&mut self, pkg: &PackageJson) {
        for target in pkg.entry_targets() {
            let relative: PathBuf = Path::new(&target)
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if relative.as_os_str().is_empty() || relative.is_absolute() {
                continue;
            }

            let key = module_key(&relative);
            if let Some(source) = source_equivalent(&key) {
                self.modules.insert(source);
            }
            self.modules.insert(key);
        }
    }

    /// Number of explicit files, stems and manifest modules.
    pub fn len(&self) -> usize {
        self.files.len() + self.names.len() + self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntryPredicate for EntryPoints {
    fn is_entry(&self, path: &Path) -> bool {
        if self.files.contains(path) {
            return true;
        }

        let stem_matches = module_key(path)
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| self.names.contains(stem));
        if stem_matches {
            return true;
        }

        path.strip_prefix(&self.root)
            .is_ok_and(|relative| self.modules.contains(&module_key(relative)))
    }
}

/// Path without its extension, treating `.d.ts` as one extension.
fn module_key(path: &Path) -> PathBuf {
    let stripped = path.with_extension("");
    if stripped.extension().is_some_and(|ext| ext == "d") {
        stripped.with_extension("")
    } else {
        stripped
    }
}

/// `dist/a/b` -> `src/a/b` for known build directories.
fn source_equivalent(key: &Path) -> Option<PathBuf> {
    let mut components = key.components();
    let first = components.next()?.as_os_str().to_str()?;
    if !BUILD_DIRS.contains(&first) {
        return None;
    }
    let rest = components.as_path();
    if rest.as_os_str().is_empty() {
        return None;
    }
    Some(Path::new("src").join(rest))
}
