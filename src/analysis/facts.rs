//! Export/import facts extracted from a single source file.
//!
//! Both extractors produce the same [`FileFacts`] shape, so everything
//! downstream of extraction is agnostic to how a file was read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::normalize::{normalize, NormalizedText};

/// A source file loaded for analysis.
///
/// Holds the raw text together with its normalized mask. Created once per
/// file and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    normalized: NormalizedText,
}

impl SourceFile {
    /// Create a source file from text already in memory.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = normalize(&text);
        Self {
            path: path.into(),
            text,
            normalized,
        }
    }

    /// Read a source file from disk.
    pub fn read(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(path, text))
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Comment/string mask of the source text.
    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }
}

/// The form an export takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// `export const foo`, `export { foo }`, `export { a as foo } from './x'`
    Named,
    /// `export default ...` or `export { foo as default }`
    Default,
    /// `export * as ns from './x'`
    NamespaceTarget,
    /// `export * from './x'`
    Wildcard,
}

/// A single exported binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Exported name as seen by importers (`"default"` for default exports,
    /// `"*"` for wildcard re-exports)
    pub name: String,
    /// Kind of export
    pub kind: ExportKind,
    /// File declaring the export
    pub file: PathBuf,
    /// Line number in the source file (1-indexed)
    pub line: usize,
    /// Module the binding is re-exported from, if any
    pub source: Option<String>,
}

impl ExportRecord {
    /// Create a local (non re-export) record.
    pub fn new(name: impl Into<String>, kind: ExportKind, file: &Path, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.to_path_buf(),
            line,
            source: None,
        }
    }

    /// Attach the re-export source specifier.
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns true for `export * from` records, which carry no name of their own.
    pub fn is_wildcard(&self) -> bool {
        self.kind == ExportKind::Wildcard
    }
}

/// The binding an import consumes from its target module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportedName {
    /// `import foo from './x'`
    Default,
    /// `import * as ns from './x'`, `export * from './x'`, `require('./x')`
    Namespace,
    /// `import { foo } from './x'` (the name exported by the target)
    Named(String),
    /// `import './x'`
    SideEffect,
}

impl ImportedName {
    /// Build from an exported name, folding `default` into [`ImportedName::Default`].
    pub fn from_export_name(name: &str) -> Self {
        match name {
            "default" => ImportedName::Default,
            "*" => ImportedName::Namespace,
            other => ImportedName::Named(other.to_string()),
        }
    }

    /// The name as it appears in the target's export table.
    pub fn as_str(&self) -> &str {
        match self {
            ImportedName::Default => "default",
            ImportedName::Namespace => "*",
            ImportedName::Named(name) => name,
            ImportedName::SideEffect => "",
        }
    }
}

/// The syntactic form that produced an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// ES module `import` statement
    Static,
    /// `export ... from` re-export
    ReExport,
    /// CommonJS `require('...')`
    Require,
    /// `import('...')` expression
    Dynamic,
}

/// A single consumed binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Binding consumed from the target
    pub imported: ImportedName,
    /// Source specifier as written (e.g. `"./utils"`, `"react"`)
    pub source: String,
    /// Syntactic form
    pub kind: ImportKind,
    /// File declaring the import
    pub file: PathBuf,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl ImportRecord {
    pub fn new(
        imported: ImportedName,
        source: impl Into<String>,
        kind: ImportKind,
        file: &Path,
        line: usize,
    ) -> Self {
        Self {
            imported,
            source: source.into(),
            kind,
            file: file.to_path_buf(),
            line,
        }
    }
}

/// Which extractor produced a file's facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Full tree-sitter parse
    Syntax,
    /// Regex rules over masked text
    Pattern,
}

/// All facts extracted from one file.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub path: PathBuf,
    pub exports: Vec<ExportRecord>,
    pub imports: Vec<ImportRecord>,
    pub strategy: Strategy,
}

impl FileFacts {
    pub fn new(path: &Path, strategy: Strategy) -> Self {
        Self {
            path: path.to_path_buf(),
            exports: Vec::new(),
            imports: Vec::new(),
            strategy,
        }
    }

    /// Record `export { name as alias } from 'source'`.
    ///
    /// Adds the alias to this file's exports and consumes `name` from the
    /// source module, so the original binding counts as used.
    pub fn push_reexport(&mut self, name: &str, alias: &str, source: &str, line: usize) {
        let kind = if alias == "default" {
            ExportKind::Default
        } else {
            ExportKind::Named
        };
        self.exports
            .push(ExportRecord::new(alias, kind, &self.path, line).from_source(source));
        self.imports.push(ImportRecord::new(
            ImportedName::from_export_name(name),
            source,
            ImportKind::ReExport,
            &self.path,
            line,
        ));
    }

    /// Record `export * from 'source'` or `export * as ns from 'source'`.
    pub fn push_star_reexport(&mut self, namespace: Option<&str>, source: &str, line: usize) {
        let record = match namespace {
            Some(ns) => ExportRecord::new(ns, ExportKind::NamespaceTarget, &self.path, line),
            None => ExportRecord::new("*", ExportKind::Wildcard, &self.path, line),
        };
        self.exports.push(record.from_source(source));
        self.imports.push(ImportRecord::new(
            ImportedName::Namespace,
            source,
            ImportKind::ReExport,
            &self.path,
            line,
        ));
    }

    /// Record a local export.
    pub fn push_export(&mut self, name: &str, line: usize) {
        let kind = if name == "default" {
            ExportKind::Default
        } else {
            ExportKind::Named
        };
        self.exports
            .push(ExportRecord::new(name, kind, &self.path, line));
    }

    /// Record an import.
    pub fn push_import(&mut self, imported: ImportedName, source: &str, kind: ImportKind, line: usize) {
        self.imports
            .push(ImportRecord::new(imported, source, kind, &self.path, line));
    }

    /// Names of all non-wildcard exports, in declaration order.
    pub fn export_names(&self) -> Vec<&str> {
        self.exports
            .iter()
            .filter(|e| !e.is_wildcard())
            .map(|e| e.name.as_str())
            .collect()
    }
}
