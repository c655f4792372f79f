//! Source code analysis module for shakeguard.
//!
//! This module turns one JavaScript/TypeScript file into [`FileFacts`]: the
//! names it exports and the bindings it consumes from other modules.
//!
//! # Features
//!
//! - Mask comments and string bodies without a grammar ([`normalize`])
//! - Full tree-sitter parse for JS, TS and TSX ([`SyntaxExtractor`])
//! - Regex fallback for files the parser rejects ([`PatternExtractor`])
//! - One entry point that picks between them ([`ModuleAnalyzer`])
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use shakeguard::analysis::ModuleAnalyzer;
//!
//! let mut analyzer = ModuleAnalyzer::new()?;
//! let facts = analyzer.analyze_file(Path::new("src/index.ts"))?;
//!
//! for export in &facts.exports {
//!     println!("{}:{} exports {}", export.file.display(), export.line, export.name);
//! }
//! ```

pub mod facts;
pub mod normalize;
pub mod patterns;
pub mod syntax;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

// Re-export main types for convenience
pub use facts::{
    ExportKind, ExportRecord, FileFacts, ImportKind, ImportRecord, ImportedName, SourceFile,
    Strategy,
};
pub use normalize::{normalize, NormalizedText};
pub use patterns::PatternExtractor;
pub use syntax::{SourceLanguage, SyntaxExtractor};

/// Errors that can occur during analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Invalid project root: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Outcome of one extraction attempt.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// The extractor read the whole file.
    Complete(FileFacts),
    /// The extractor could not read the file and emitted nothing.
    Unparseable,
}

/// Anything that can turn a source file into facts.
pub trait FactExtractor {
    fn extract(&mut self, file: &SourceFile) -> Extraction;
}

/// Runs the syntax extractor and falls back to patterns when it gives up.
///
/// Exactly one extractor contributes to any given file.
pub struct ModuleAnalyzer {
    syntax: SyntaxExtractor,
    patterns: PatternExtractor,
}

impl ModuleAnalyzer {
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            syntax: SyntaxExtractor::new()?,
            patterns: PatternExtractor::new(),
        })
    }

    /// Extract facts from a file already in memory.
    pub fn analyze(&mut self, file: &SourceFile) -> FileFacts {
        if let Extraction::Complete(facts) = self.syntax.extract(file) {
            return facts;
        }

        debug!(path = %file.path().display(), "parse failed, using pattern fallback");
        self.patterns.extract_facts(file)
    }

    /// Read and extract a file from disk.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<FileFacts> {
        let file = SourceFile::read(path)?;
        Ok(self.analyze(&file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parseable_file_uses_syntax() {
        let mut analyzer = ModuleAnalyzer::new().unwrap();
        let facts = analyzer.analyze(&SourceFile::new("/p/a.ts", "export const a = 1;\n"));
        assert_eq!(facts.strategy, Strategy::Syntax);
        assert_eq!(facts.export_names(), vec!["a"]);
    }

    #[test]
    fn test_broken_file_falls_back_to_patterns() {
        let source = "// export const ghost = 0;\nexport const a = 1;\nexport function (\n";
        let mut analyzer = ModuleAnalyzer::new().unwrap();
        let facts = analyzer.analyze(&SourceFile::new("/p/a.js", source));

        assert_eq!(facts.strategy, Strategy::Pattern);
        assert_eq!(facts.export_names(), vec!["a"]);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_patterns() {
        let mut analyzer = ModuleAnalyzer::new().unwrap();
        let facts = analyzer.analyze(&SourceFile::new(
            "/p/Widget.vue",
            "import { ref } from 'vue';\nexport default {}\n",
        ));
        assert_eq!(facts.strategy, Strategy::Pattern);
        assert_eq!(facts.imports.len(), 1);
        assert_eq!(facts.exports[0].kind, ExportKind::Default);
    }

    #[test]
    fn test_analyze_file_reads_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "import b from './b';\n").unwrap();

        let mut analyzer = ModuleAnalyzer::new().unwrap();
        let facts = analyzer.analyze_file(&path).unwrap();
        assert_eq!(facts.path, path);
        assert_eq!(facts.imports[0].imported, ImportedName::Default);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut analyzer = ModuleAnalyzer::new().unwrap();
        let result = analyzer.analyze_file(Path::new("/definitely/not/here.js"));
        assert!(matches!(result, Err(AnalysisError::FileRead(_))));
    }
}
