//! Regex-based export/import extraction for files tree-sitter cannot parse.
//!
//! Rules run over the raw text in a fixed order. A match only counts when
//! its first byte is real code according to the normalizer mask, which keeps
//! commented-out and quoted examples out of the facts. Brace lists are
//! matched on the masked text instead, so a `}` inside a comment or string
//! cannot close them early.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

use super::facts::{FileFacts, ImportKind, ImportedName, SourceFile, Strategy};
use super::normalize::NormalizedText;
use super::{Extraction, FactExtractor};

static EXPORT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bexport\s+(?:declare\s+)?(?:async\s+)?(?:(?:const\s+enum|const|let|var|abstract\s+class|class|interface|type|enum|namespace)\s+|function\s*\*?\s*)([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});

static EXPORT_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bexport\s+(?:type\s+)?\{([^}]*)\}(?:\s*from\s*['"]([^'"]+)['"])?"#).unwrap()
});

static EXPORT_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bexport\s+(?:type\s+)?\*\s*(?:as\s+([A-Za-z_$][\w$]*)\s+)?from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static IMPORT_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?(?:([A-Za-z_$][\w$]*)\s*,\s*)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static IMPORT_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?([A-Za-z_$][\w$]*)\s*(?:,\s*\*\s*as\s+[A-Za-z_$][\w$]*\s*)?from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static IMPORT_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?(?:[A-Za-z_$][\w$]*\s*,\s*)?\*\s*as\s+[A-Za-z_$][\w$]*\s+from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+default\b").unwrap());

static IMPORT_SIDE_EFFECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*['"]([^'"]+)['"]"#).unwrap());

static REQUIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

/// Fallback extractor. Always completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule over `file` and collect the accepted matches.
    pub fn extract_facts(&self, file: &SourceFile) -> FileFacts {
        let mut scan = Scan::new(file);

        for caps in scan.accepted(&EXPORT_DECLARATION) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            scan.facts.push_export(&caps[1], line);
        }

        for caps in scan.accepted_masked(&EXPORT_LIST) {
            let Some(list) = caps.get(1) else { continue };
            let source = caps.get(2).and_then(|m| scan.raw(m)).map(str::to_string);
            for item in scan.list_items(list.start(), list.end()) {
                let line = scan.line_at(item.offset);
                let alias = item.alias.as_deref().unwrap_or(&item.name);
                match &source {
                    Some(module) => scan.facts.push_reexport(&item.name, alias, module, line),
                    None => scan.facts.push_export(alias, line),
                }
            }
        }

        for caps in scan.accepted(&EXPORT_ALL) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            let namespace = caps.get(1).map(|m| m.as_str());
            scan.facts.push_star_reexport(namespace, &caps[2], line);
        }

        for caps in scan.accepted_masked(&IMPORT_LIST) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            let Some(module) = caps.get(3).and_then(|m| scan.raw(m)).map(str::to_string) else {
                continue;
            };
            if caps.get(1).is_some() {
                scan.facts
                    .push_import(ImportedName::Default, &module, ImportKind::Static, line);
            }
            let Some(list) = caps.get(2) else { continue };
            for item in scan.list_items(list.start(), list.end()) {
                let line = scan.line_at(item.offset);
                scan.facts.push_import(
                    ImportedName::from_export_name(&item.name),
                    &module,
                    ImportKind::Static,
                    line,
                );
            }
        }

        for caps in scan.accepted(&IMPORT_DEFAULT) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            scan.facts
                .push_import(ImportedName::Default, &caps[2], ImportKind::Static, line);
        }

        for caps in scan.accepted(&IMPORT_NAMESPACE) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            scan.facts
                .push_import(ImportedName::Namespace, &caps[1], ImportKind::Static, line);
        }

        for caps in scan.accepted(&EXPORT_DEFAULT) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            scan.facts.push_export("default", line);
        }

        for caps in scan.accepted(&IMPORT_SIDE_EFFECT) {
            let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
            scan.facts
                .push_import(ImportedName::SideEffect, &caps[1], ImportKind::Static, line);
        }

        for (rule, kind) in [
            (&*REQUIRE_CALL, ImportKind::Require),
            (&*DYNAMIC_IMPORT, ImportKind::Dynamic),
        ] {
            for caps in scan.accepted(rule) {
                let line = scan.line_at(caps.get(0).map_or(0, |m| m.start()));
                scan.facts
                    .push_import(ImportedName::Namespace, &caps[1], kind, line);
            }
        }

        scan.facts
    }
}

impl FactExtractor for PatternExtractor {
    fn extract(&mut self, file: &SourceFile) -> Extraction {
        Extraction::Complete(self.extract_facts(file))
    }
}

/// One entry of a `{ a, b as c }` list.
#[derive(Debug, PartialEq, Eq)]
struct ListItem {
    name: String,
    alias: Option<String>,
    offset: usize,
}

/// Per-file matching state.
struct Scan<'a> {
    text: &'a str,
    normalized: &'a NormalizedText,
    line_starts: Vec<usize>,
    facts: FileFacts,
}

impl<'a> Scan<'a> {
    fn new(file: &'a SourceFile) -> Self {
        let text = file.text();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            normalized: file.normalized(),
            line_starts,
            facts: FileFacts::new(file.path(), Strategy::Pattern),
        }
    }

    /// Matches of `rule` whose start offset is real code.
    fn accepted(&self, rule: &Regex) -> Vec<Captures<'a>> {
        let text = self.text;
        rule.captures_iter(text)
            .filter(|caps| {
                caps.get(0)
                    .is_some_and(|m| !self.normalized.is_masked(m.start()))
            })
            .collect()
    }

    /// Matches of `rule` against the masked text. String bodies are blank
    /// there, so read quoted groups back with [`Scan::raw`].
    fn accepted_masked(&self, rule: &Regex) -> Vec<Captures<'a>> {
        let masked = self.normalized.as_str();
        rule.captures_iter(masked)
            .filter(|caps| {
                caps.get(0)
                    .is_some_and(|m| !self.normalized.is_masked(m.start()))
            })
            .collect()
    }

    /// Raw text under a match taken from the masked text.
    fn raw(&self, m: Match<'_>) -> Option<&'a str> {
        self.text.get(m.range())
    }

    /// 1-based line containing `offset`.
    fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// Split a brace list into items. Reads the masked text so comments
    /// inside multi-line lists are ignored.
    fn list_items(&self, start: usize, end: usize) -> Vec<ListItem> {
        let Some(list) = self.normalized.as_str().get(start..end) else {
            return Vec::new();
        };

        let mut items = Vec::new();
        let mut offset = start;
        for raw in list.split(',') {
            let item_offset = offset + (raw.len() - raw.trim_start().len());
            offset += raw.len() + 1;

            let mut tokens: Vec<&str> = raw.split_whitespace().collect();
            if tokens.len() > 1 && tokens[0] == "type" {
                tokens.remove(0);
            }
            let (name, alias) = match tokens.as_slice() {
                [name] => (*name, None),
                [name, "as", alias] => (*name, Some(*alias)),
                _ => continue,
            };
            let name = unquote(name);
            if name.is_empty() {
                continue;
            }
            items.push(ListItem {
                name: name.to_string(),
                alias: alias.map(|a| unquote(a).to_string()),
                offset: item_offset,
            });
        }
        items
    }
}

fn unquote(token: &str) -> &str {
    token.trim_matches(['"', '\''])
}
