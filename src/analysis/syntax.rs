//! Export/import extraction using tree-sitter for JavaScript/TypeScript.
//!
//! This is the primary extractor: it parses the whole file and walks the
//! syntax tree once. A tree containing error nodes is treated as a failed
//! parse, and nothing from it is emitted.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

use super::facts::{FileFacts, ImportKind, ImportedName, SourceFile, Strategy};
use super::{AnalysisError, AnalysisResult, Extraction, FactExtractor};

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Extracts facts from a full tree-sitter parse.
pub struct SyntaxExtractor {
    js_parser: Parser,
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl SyntaxExtractor {
    /// Create a new SyntaxExtractor with one parser per grammar.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            js_parser: Self::parser_for(SourceLanguage::JavaScript)?,
            ts_parser: Self::parser_for(SourceLanguage::TypeScript)?,
            tsx_parser: Self::parser_for(SourceLanguage::Tsx)?,
        })
    }

    fn parser_for(language: SourceLanguage) -> AnalysisResult<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|_| AnalysisError::LanguageInit)?;
        Ok(parser)
    }

    /// Parse source text, returning `None` unless the tree is error-free.
    fn parse(&mut self, source: &str, language: SourceLanguage) -> Option<Tree> {
        let parser = match language {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => &mut self.js_parser,
            SourceLanguage::TypeScript => &mut self.ts_parser,
            SourceLanguage::Tsx => &mut self.tsx_parser,
        };

        let tree = parser.parse(source, None)?;
        if tree.root_node().has_error() {
            return None;
        }
        Some(tree)
    }

    /// Recursively visit nodes to find exports, imports and require calls.
    ///
    /// Export and import statements only count at module scope. Bodies of
    /// `namespace`, `declare module` and `declare global` blocks declare
    /// members of another scope, so only calls are collected inside them.
    fn visit_node(
        &self,
        cursor: &mut TreeCursor,
        source: &str,
        facts: &mut FileFacts,
        in_declaration_scope: bool,
    ) {
        let node = cursor.node();

        match node.kind() {
            "export_statement" if !in_declaration_scope => {
                self.parse_export(&node, source, facts)
            }
            "import_statement" if !in_declaration_scope => {
                self.parse_import(&node, source, facts)
            }
            "call_expression" => self.parse_require_or_dynamic_import(&node, source, facts),
            _ => {}
        }

        let nested = in_declaration_scope
            || matches!(node.kind(), "internal_module" | "module" | "ambient_declaration");

        if cursor.goto_first_child() {
            loop {
                self.visit_node(cursor, source, facts, nested);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    /// Parse an export statement in any of its forms.
    fn parse_export(&self, node: &Node, source: &str, facts: &mut FileFacts) {
        let line = line_of(node);
        let source_module = node
            .child_by_field_name("source")
            .and_then(|s| self.extract_string_value(&s, source));

        let mut is_default = false;
        let mut is_star = false;
        let mut namespace = None;
        let mut clause = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "default" => is_default = true,
                "*" => is_star = true,
                "namespace_export" => {
                    is_star = true;
                    namespace = self.namespace_export_name(&child, source);
                }
                "export_clause" => clause = Some(child),
                _ => {}
            }
        }

        if is_default {
            facts.push_export("default", line);
            return;
        }

        if let Some(module) = source_module {
            if let Some(clause) = clause {
                for (name, alias, spec_line) in self.export_specifiers(&clause, source) {
                    let alias = alias.as_deref().unwrap_or(&name);
                    facts.push_reexport(&name, alias, &module, spec_line);
                }
            } else if is_star {
                facts.push_star_reexport(namespace.as_deref(), &module, line);
            }
            return;
        }

        if let Some(clause) = clause {
            for (name, alias, spec_line) in self.export_specifiers(&clause, source) {
                facts.push_export(alias.as_deref().unwrap_or(&name), spec_line);
            }
            return;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let decl_line = line_of(&declaration);
            let mut names = Vec::new();
            self.declaration_names(&declaration, source, &mut names);
            for name in names {
                facts.push_export(&name, decl_line);
            }
        }
    }

    /// Parse `{ a, b as c }` into (name, alias, line) triples.
    fn export_specifiers(
        &self,
        clause: &Node,
        source: &str,
    ) -> Vec<(String, Option<String>, usize)> {
        let mut specifiers = Vec::new();
        let mut cursor = clause.walk();

        for child in clause.children(&mut cursor) {
            if child.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = child
                .child_by_field_name("name")
                .and_then(|n| self.module_export_name(&n, source))
            else {
                continue;
            };
            let alias = child
                .child_by_field_name("alias")
                .and_then(|n| self.module_export_name(&n, source));
            specifiers.push((name, alias, line_of(&child)));
        }

        specifiers
    }

    /// Find the name in `export * as NAME from '...'`.
    fn namespace_export_name(&self, node: &Node, source: &str) -> Option<String> {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .last()
            .and_then(|child| self.module_export_name(&child, source));
        name
    }

    /// Collect the bound names of an exported declaration.
    fn declaration_names(&self, node: &Node, source: &str, names: &mut Vec<String>) {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                for declarator in node.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(pattern) = declarator.child_by_field_name("name") {
                        self.binding_names(&pattern, source, names);
                    }
                }
            }
            "ambient_declaration" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.declaration_names(&child, source, names);
                }
            }
            _ => {
                if let Some(name) = node
                    .child_by_field_name("name")
                    .and_then(|n| self.node_text(&n, source))
                {
                    names.push(name.to_string());
                }
            }
        }
    }

    /// Collect identifiers bound by a (possibly destructuring) pattern.
    fn binding_names(&self, node: &Node, source: &str, names: &mut Vec<String>) {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                if let Some(name) = self.node_text(node, source) {
                    names.push(name.to_string());
                }
            }
            "pair_pattern" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.binding_names(&value, source, names);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.binding_names(&left, source, names);
                }
            }
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.binding_names(&child, source, names);
                }
            }
            _ => {}
        }
    }

    /// Parse an ES6 import statement.
    fn parse_import(&self, node: &Node, source: &str, facts: &mut FileFacts) {
        let line = line_of(node);
        let mut source_module = None;
        let mut clause = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "string" => source_module = self.extract_string_value(&child, source),
                "import_clause" => clause = Some(child),
                "import_require_clause" => {
                    // TypeScript: import x = require('./x')
                    if let Some(module) = child
                        .child_by_field_name("source")
                        .and_then(|s| self.extract_string_value(&s, source))
                    {
                        facts.push_import(ImportedName::Namespace, &module, ImportKind::Require, line);
                    }
                }
                _ => {}
            }
        }

        let Some(module) = source_module else {
            return;
        };

        match clause {
            Some(clause) => self.parse_import_clause(&clause, source, &module, facts),
            None => facts.push_import(ImportedName::SideEffect, &module, ImportKind::Static, line),
        }
    }

    /// Parse the import clause (everything between 'import' and 'from').
    fn parse_import_clause(&self, node: &Node, source: &str, module: &str, facts: &mut FileFacts) {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    // Default import: import foo from 'module'
                    facts.push_import(ImportedName::Default, module, ImportKind::Static, line_of(&child));
                }
                "namespace_import" => {
                    // Namespace import: import * as foo from 'module'
                    facts.push_import(ImportedName::Namespace, module, ImportKind::Static, line_of(&child));
                }
                "named_imports" => {
                    // Named imports: import { foo, bar as baz } from 'module'
                    let mut specs = child.walk();
                    for spec in child.children(&mut specs) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        if let Some(name) = spec
                            .child_by_field_name("name")
                            .and_then(|n| self.module_export_name(&n, source))
                        {
                            facts.push_import(
                                ImportedName::from_export_name(&name),
                                module,
                                ImportKind::Static,
                                line_of(&spec),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Parse require() calls or dynamic import().
    fn parse_require_or_dynamic_import(&self, node: &Node, source: &str, facts: &mut FileFacts) {
        let Some(func_node) = node.child_by_field_name("function") else {
            return;
        };
        let kind = match self.node_text(&func_node, source) {
            Some("require") => ImportKind::Require,
            Some("import") => ImportKind::Dynamic,
            _ => return,
        };
        let Some(args_node) = node.child_by_field_name("arguments") else {
            return;
        };

        let mut args_cursor = args_node.walk();
        let module = args_node
            .children(&mut args_cursor)
            .find(|child| child.kind() == "string")
            .and_then(|child| self.extract_string_value(&child, source));

        if let Some(module) = module {
            facts.push_import(ImportedName::Namespace, &module, kind, line_of(node));
        }
    }

    /// Text of an identifier or string used as a module export name.
    fn module_export_name(&self, node: &Node, source: &str) -> Option<String> {
        if node.kind() == "string" {
            self.extract_string_value(node, source)
        } else {
            self.node_text(node, source).map(|s| s.to_string())
        }
    }

    /// Extract the text content of a node.
    fn node_text<'a>(&self, node: &Node, source: &'a str) -> Option<&'a str> {
        source.get(node.start_byte()..node.end_byte())
    }

    /// Extract string value (removes quotes).
    fn extract_string_value(&self, node: &Node, source: &str) -> Option<String> {
        let text = self.node_text(node, source)?;
        let trimmed = text
            .trim_start_matches(['"', '\'', '`'])
            .trim_end_matches(['"', '\'', '`']);
        Some(trimmed.to_string())
    }
}

impl FactExtractor for SyntaxExtractor {
    fn extract(&mut self, file: &SourceFile) -> Extraction {
        let Some(language) = SourceLanguage::from_path(file.path()) else {
            return Extraction::Unparseable;
        };
        let Some(tree) = self.parse(file.text(), language) else {
            return Extraction::Unparseable;
        };

        let mut facts = FileFacts::new(file.path(), Strategy::Syntax);
        let mut cursor = tree.root_node().walk();
        self.visit_node(&mut cursor, file.text(), &mut facts, false);
        Extraction::Complete(facts)
    }
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}
