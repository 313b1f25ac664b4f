// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency-graph ordering for plugin activation and deactivation.
//!
//! Both lifecycle managers consult the same graph; they differ only in how
//! a dependency absent from the known set is treated, expressed here as
//! [`MissingPolicy`].

use std::collections::{BTreeMap, HashMap, HashSet};

use weft_core::WeftError;

/// How to treat a dependency that is not in the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Hard failure: the dependency must be registered.
    Fail,
    /// Treat it as already satisfied externally (the engine may load a
    /// partial subset of a larger configuration).
    AssumeSatisfied,
}

/// Three-colour visitation marker for cycle-safe traversal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Directed dependency graph: edge from dependent to required plugin.
///
/// Node and edge storage is ordered so traversal results and error
/// messages are deterministic.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    deps: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its dependency names (may be empty).
    pub fn insert(&mut self, name: impl Into<String>, dependencies: Vec<String>) {
        self.deps.insert(name.into(), dependencies);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }

    /// Activation order for `target`: a sequence ending with `target`, each
    /// prior entry before anything that depends on it.
    ///
    /// A node revisited while in progress signals a cycle naming the
    /// implicated plugin. Unknown dependencies fail or are skipped per
    /// `missing`.
    pub fn enable_order(
        &self,
        target: &str,
        missing: MissingPolicy,
    ) -> Result<Vec<String>, WeftError> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut order = Vec::new();
        self.visit(target, None, missing, &mut marks, &mut order)?;
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        required_by: Option<&str>,
        missing: MissingPolicy,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) -> Result<(), WeftError> {
        match marks.get(node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(WeftError::CircularDependency {
                    name: node.to_string(),
                });
            }
            None => {}
        }

        let Some(deps) = self.deps.get(node) else {
            return match missing {
                MissingPolicy::Fail => Err(WeftError::UnsatisfiedDependency {
                    name: required_by.unwrap_or(node).to_string(),
                    dependency: node.to_string(),
                }),
                MissingPolicy::AssumeSatisfied => {
                    marks.insert(node, Mark::Done);
                    Ok(())
                }
            };
        };

        marks.insert(node, Mark::InProgress);
        for dep in deps {
            self.visit(dep, Some(node), missing, marks, order)?;
        }
        marks.insert(node, Mark::Done);
        order.push(node.to_string());
        Ok(())
    }

    /// Activation order covering every node in the graph.
    pub fn full_enable_order(&self, missing: MissingPolicy) -> Result<Vec<String>, WeftError> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut order = Vec::new();
        for name in self.deps.keys() {
            self.visit(name, None, missing, &mut marks, &mut order)?;
        }
        // Externally-satisfied placeholders never land in `order`, so the
        // result contains exactly the known nodes.
        Ok(order)
    }

    /// Deactivation order for `target`: `target` plus every transitively
    /// *enabled* dependent, dependents strictly before what they depend on.
    pub fn disable_order(&self, target: &str, enabled: &HashSet<String>) -> Vec<String> {
        // Reverse graph: who depends on me.
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, deps) in &self.deps {
            for dep in deps {
                dependents.entry(dep.as_str()).or_default().push(name.as_str());
            }
        }
        for list in dependents.values_mut() {
            list.sort_unstable();
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut order: Vec<String> = Vec::new();

        fn walk<'a>(
            node: &'a str,
            dependents: &BTreeMap<&'a str, Vec<&'a str>>,
            enabled: &HashSet<String>,
            visited: &mut HashSet<&'a str>,
            order: &mut Vec<String>,
        ) {
            if !visited.insert(node) {
                return;
            }
            if let Some(children) = dependents.get(node) {
                for child in children {
                    if enabled.contains(*child) {
                        walk(child, dependents, enabled, visited, order);
                    }
                }
            }
            order.push(node.to_string());
        }

        walk(target, &dependents, enabled, &mut visited, &mut order);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> DependencyGraph {
        // c-top -> b-middle -> a-base
        let mut g = DependencyGraph::new();
        g.insert("a-base", vec![]);
        g.insert("b-middle", vec!["a-base".into()]);
        g.insert("c-top", vec!["b-middle".into()]);
        g
    }

    #[test]
    fn enable_order_is_dependencies_first() {
        let g = chain_graph();
        let order = g.enable_order("c-top", MissingPolicy::Fail).unwrap();
        assert_eq!(order, vec!["a-base", "b-middle", "c-top"]);
    }

    #[test]
    fn enable_order_of_leaf_is_just_the_leaf() {
        let g = chain_graph();
        let order = g.enable_order("a-base", MissingPolicy::Fail).unwrap();
        assert_eq!(order, vec!["a-base"]);
    }

    #[test]
    fn shared_dependency_appears_once() {
        let mut g = DependencyGraph::new();
        g.insert("base", vec![]);
        g.insert("left", vec!["base".into()]);
        g.insert("right", vec!["base".into()]);
        g.insert("top", vec!["left".into(), "right".into()]);

        let order = g.enable_order("top", MissingPolicy::Fail).unwrap();
        assert_eq!(order, vec!["base", "left", "right", "top"]);
    }

    #[test]
    fn cycle_is_detected_and_names_a_member() {
        let mut g = DependencyGraph::new();
        g.insert("cycle-a", vec!["cycle-b".into()]);
        g.insert("cycle-b", vec!["cycle-a".into()]);

        let err = g.enable_order("cycle-a", MissingPolicy::Fail).unwrap_err();
        match err {
            WeftError::CircularDependency { name } => {
                assert!(name.starts_with("cycle-"), "unexpected member {name}");
            }
            other => panic!("expected CircularDependency, got {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut g = DependencyGraph::new();
        g.insert("selfish", vec!["selfish".into()]);
        assert!(matches!(
            g.enable_order("selfish", MissingPolicy::Fail),
            Err(WeftError::CircularDependency { name }) if name == "selfish"
        ));
    }

    #[test]
    fn missing_dependency_fails_or_is_assumed() {
        let mut g = DependencyGraph::new();
        g.insert("consumer", vec!["missing-dep".into()]);

        let err = g.enable_order("consumer", MissingPolicy::Fail).unwrap_err();
        match err {
            WeftError::UnsatisfiedDependency { name, dependency } => {
                assert_eq!(name, "consumer");
                assert_eq!(dependency, "missing-dep");
            }
            other => panic!("expected UnsatisfiedDependency, got {other}"),
        }

        let order = g
            .enable_order("consumer", MissingPolicy::AssumeSatisfied)
            .unwrap();
        assert_eq!(order, vec!["consumer"]);
    }

    #[test]
    fn full_enable_order_covers_every_node_once() {
        let g = chain_graph();
        let order = g.full_enable_order(MissingPolicy::Fail).unwrap();
        assert_eq!(order, vec!["a-base", "b-middle", "c-top"]);
    }

    #[test]
    fn disable_order_is_dependents_first() {
        let g = chain_graph();
        let enabled: HashSet<String> =
            ["a-base", "b-middle", "c-top"].iter().map(|s| s.to_string()).collect();

        let order = g.disable_order("a-base", &enabled);
        assert_eq!(order, vec!["c-top", "b-middle", "a-base"]);
    }

    #[test]
    fn disable_order_skips_disabled_dependents() {
        let g = chain_graph();
        let enabled: HashSet<String> =
            ["a-base", "b-middle"].iter().map(|s| s.to_string()).collect();

        let order = g.disable_order("a-base", &enabled);
        assert_eq!(order, vec!["b-middle", "a-base"]);
    }

    #[test]
    fn disable_order_of_top_node_is_itself() {
        let g = chain_graph();
        let enabled: HashSet<String> =
            ["a-base", "b-middle", "c-top"].iter().map(|s| s.to_string()).collect();
        assert_eq!(g.disable_order("c-top", &enabled), vec!["c-top"]);
    }
}
