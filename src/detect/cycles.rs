//! Circular import detection.
//!
//! Runs a depth-first search with an explicit stack over the static edges
//! of the graph, so long import chains cannot exhaust the call stack.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::findings::Severity;
use crate::graph::ModuleGraph;

/// Information about a detected circular dependency.
///
/// Contains the modules that form the cycle, in import order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependency {
    /// The modules in the cycle (the last imports the first)
    pub members: Vec<PathBuf>,
    pub severity: Severity,
}

impl CircularDependency {
    /// Creates a cycle record, deriving severity from its size.
    ///
    /// One or two members rate high, three or more critical.
    pub fn new(members: Vec<PathBuf>) -> Self {
        let severity = if members.len() >= 3 {
            Severity::Critical
        } else {
            Severity::High
        };
        Self { members, severity }
    }

    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a.ts -> b.ts -> a.ts"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.members.first() else {
            return String::new();
        };
        let mut path = self
            .members
            .iter()
            .map(|m| m.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        path.push_str(" -> ");
        path.push_str(&first.display().to_string());
        path
    }

    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One level of the explicit DFS stack.
struct Frame<'g> {
    neighbors: Vec<&'g Path>,
    next: usize,
}

impl<'g> Frame<'g> {
    fn new(graph: &'g ModuleGraph, node: &Path) -> Self {
        Self {
            neighbors: graph.static_dependencies(node),
            next: 0,
        }
    }

    fn next_neighbor(&mut self) -> Option<&'g Path> {
        let neighbor = self.neighbors.get(self.next).copied();
        self.next += 1;
        neighbor
    }
}

/// Find import cycles among project modules.
///
/// Edges made only of dynamic `import()` calls are ignored since they do not
/// take part in module evaluation order. Each distinct member set is reported
/// once, no matter which module the search reached it from. Nodes and
/// neighbors are visited in path order, so output is deterministic.
pub fn find_cycles(graph: &ModuleGraph) -> Vec<CircularDependency> {
    let mut cycles = Vec::new();
    let mut seen: HashSet<Vec<&Path>> = HashSet::new();
    let mut visited: HashSet<&Path> = HashSet::new();

    for start in graph.modules() {
        let start = start.path.as_path();
        if !visited.insert(start) {
            continue;
        }

        let mut path: Vec<&Path> = vec![start];
        let mut on_path: HashMap<&Path, usize> = HashMap::from([(start, 0)]);
        let mut stack = vec![Frame::new(graph, start)];

        while let Some(frame) = stack.last_mut() {
            let Some(next) = frame.next_neighbor() else {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                }
                continue;
            };

            if let Some(&position) = on_path.get(next) {
                let members = &path[position..];
                let mut key = members.to_vec();
                key.sort();
                if seen.insert(key) {
                    cycles.push(CircularDependency::new(
                        members.iter().map(|m| m.to_path_buf()).collect(),
                    ));
                }
                continue;
            }

            if visited.insert(next) {
                on_path.insert(next, path.len());
                path.push(next);
                stack.push(Frame::new(graph, next));
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileFacts, ImportKind, ImportedName, Strategy};
    use crate::graph::{GraphBuilder, ModuleFacts};
    use crate::resolve::Resolution;

    /// Build a graph from `(file, [(target, kind)])` pairs under `/p`.
    fn graph(edges: Vec<(&str, Vec<(&str, ImportKind)>)>) -> ModuleGraph {
        let mut builder = GraphBuilder::new();
        for (file, targets) in edges {
            let mut facts = FileFacts::new(Path::new(&format!("/p/{file}.ts")), Strategy::Syntax);
            for (target, kind) in targets {
                facts.push_import(ImportedName::Namespace, &format!("./{target}"), kind, 1);
            }
            builder.add_module(ModuleFacts::resolve_with(facts, |record| {
                Resolution::Local(PathBuf::from(format!(
                    "/p/{}.ts",
                    record.source.trim_start_matches("./")
                )))
            }));
        }
        builder.finish()
    }

    fn stems(cycle: &CircularDependency) -> Vec<&str> {
        cycle
            .members
            .iter()
            .filter_map(|m| m.file_stem().and_then(|s| s.to_str()))
            .collect()
    }

    const S: ImportKind = ImportKind::Static;

    #[test]
    fn test_no_cycles() {
        let g = graph(vec![("a", vec![("b", S)]), ("b", vec![("c", S)]), ("c", vec![])]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn test_two_member_cycle_is_high() {
        let g = graph(vec![("x", vec![("y", S)]), ("y", vec![("x", S)])]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(stems(&cycles[0]), vec!["x", "y"]);
        assert_eq!(cycles[0].severity, Severity::High);
    }

    #[test]
    fn test_three_member_cycle_is_critical() {
        let g = graph(vec![("a", vec![("b", S)]), ("b", vec![("c", S)]), ("c", vec![("a", S)])]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
        assert_eq!(cycles[0].severity, Severity::Critical);
    }

    #[test]
    fn test_self_import() {
        let g = graph(vec![("a", vec![("a", S)])]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(stems(&cycles[0]), vec!["a"]);
        assert_eq!(cycles[0].severity, Severity::High);
    }

    #[test]
    fn test_same_cycle_reported_once() {
        // two entry points into the same b <-> c cycle
        let g = graph(vec![
            ("a", vec![("b", S), ("c", S)]),
            ("b", vec![("c", S)]),
            ("c", vec![("b", S)]),
            ("d", vec![("c", S)]),
        ]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(stems(&cycles[0]), vec!["b", "c"]);
    }

    #[test]
    fn test_rotations_collapse() {
        let g = graph(vec![("b", vec![("a", S)]), ("a", vec![("b", S)])]);
        let first = find_cycles(&g);
        let g = graph(vec![("a", vec![("b", S)]), ("b", vec![("a", S)])]);
        let second = find_cycles(&g);

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_separate_cycles() {
        let g = graph(vec![
            ("a", vec![("b", S)]),
            ("b", vec![("a", S)]),
            ("x", vec![("y", S)]),
            ("y", vec![("z", S)]),
            ("z", vec![("x", S)]),
        ]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 2);
        assert_eq!(stems(&cycles[0]), vec!["a", "b"]);
        assert_eq!(stems(&cycles[1]), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_dynamic_import_breaks_cycle() {
        let g = graph(vec![
            ("a", vec![("b", S)]),
            ("b", vec![("a", ImportKind::Dynamic)]),
        ]);
        assert!(find_cycles(&g).is_empty());
        assert!(g.has_cycles());
    }

    #[test]
    fn test_require_counts() {
        let g = graph(vec![
            ("a", vec![("b", ImportKind::Require)]),
            ("b", vec![("a", ImportKind::ReExport)]),
        ]);
        assert_eq!(find_cycles(&g).len(), 1);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let names: Vec<String> = (0..20_000).map(|i| format!("m{i:05}")).collect();
        let mut builder = GraphBuilder::new();
        for (i, name) in names.iter().enumerate() {
            let mut facts = FileFacts::new(Path::new(&format!("/p/{name}.ts")), Strategy::Syntax);
            let next = &names[(i + 1) % names.len()];
            facts.push_import(ImportedName::Default, &format!("./{next}"), S, 1);
            builder.add_module(ModuleFacts::resolve_with(facts, |record| {
                Resolution::Local(PathBuf::from(format!(
                    "/p/{}.ts",
                    record.source.trim_start_matches("./")
                )))
            }));
        }
        let cycles = find_cycles(&builder.finish());

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 20_000);
    }

    #[test]
    fn test_cycle_path() {
        let cycle = CircularDependency::new(vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]);
        assert_eq!(cycle.cycle_path(), "a.ts -> b.ts -> a.ts");
        assert_eq!(CircularDependency::new(Vec::new()).cycle_path(), "");
    }
}
