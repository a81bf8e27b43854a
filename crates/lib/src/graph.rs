//! Dependency graph construction.
//!
//! Expands the requested root aliases into the full reachable graph and
//! produces the structures the scheduler consumes: a reverse-dependency
//! index (node -> nodes that directly depend on it) and the initial set of
//! leaves (file dependencies and targets without dependencies).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::target::{AliasTarget, Dep, NodeId};

/// The traversal structures for one run.
#[derive(Debug, Default)]
pub struct Graph {
  /// Reverse-dependency index. A node that occurs twice in one dependant's
  /// groups records that dependant twice; the scheduler's counters rely on
  /// occurrence counts matching.
  pub dependants: HashMap<NodeId, Vec<Dep>>,
  /// Nodes with no non-empty dependency group; these start ready.
  pub leaves: Vec<Dep>,
  /// Total number of distinct reachable nodes.
  pub node_count: usize,
}

/// Expand `roots` into the full reachable graph.
///
/// Iterative work-list traversal with a visited set keyed by node identity:
/// a node reachable via multiple paths (diamond dependency) is expanded
/// exactly once but recorded as a dependant of each of its parents, so its
/// command runs at most once per build. O(V+E) over the expanded graph.
pub fn build(roots: &[Arc<AliasTarget>]) -> Graph {
  let mut dependants: HashMap<NodeId, Vec<Dep>> = HashMap::new();
  let mut leaves = Vec::new();
  let mut seen: HashSet<NodeId> = HashSet::new();
  let mut queue: VecDeque<Dep> = VecDeque::new();

  for root in roots {
    let node = Dep::from(root);
    if seen.insert(node.id()) {
      queue.push_back(node);
    }
  }

  while let Some(node) = queue.pop_front() {
    if !node.has_deps() {
      leaves.push(node);
      continue;
    }
    if let Some(groups) = node.groups() {
      for deps in groups.values() {
        for dep in deps {
          dependants.entry(dep.id()).or_default().push(node.clone());
          if seen.insert(dep.id()) {
            queue.push_back(dep.clone());
          }
        }
      }
    }
  }

  let graph = Graph {
    dependants,
    leaves,
    node_count: seen.len(),
  };
  debug!(nodes = graph.node_count, leaves = graph.leaves.len(), "graph expanded");
  graph
}

#[cfg(test)]
mod tests {
  use std::path::Path;
  use std::sync::Arc;

  use super::*;
  use crate::target::BuildTarget;

  fn target(name: &str) -> Arc<BuildTarget> {
    Arc::new(BuildTarget::new("true", format!("/tmp/{name}")))
  }

  fn leaf_ids(graph: &Graph) -> Vec<NodeId> {
    graph.leaves.iter().map(Dep::id).collect()
  }

  #[test]
  fn single_alias_without_deps_is_a_leaf() {
    let root = Arc::new(AliasTarget::new("x").with_cmd("true"));
    let graph = build(std::slice::from_ref(&root));

    assert_eq!(graph.node_count, 1);
    assert_eq!(leaf_ids(&graph), vec![Dep::from(&root).id()]);
    assert!(graph.dependants.is_empty());
  }

  #[test]
  fn linear_chain() {
    let a = target("a");
    let b = Arc::new(BuildTarget::new("true", "/tmp/b").with_deps("A", [Dep::from(&a)]));
    let root = Arc::new(AliasTarget::new("x").with_deps("B", [Dep::from(&b)]));
    let graph = build(std::slice::from_ref(&root));

    assert_eq!(graph.node_count, 3);
    assert_eq!(leaf_ids(&graph), vec![Dep::from(&a).id()]);

    let deps_of_a = &graph.dependants[&Dep::from(&a).id()];
    assert_eq!(deps_of_a.len(), 1);
    assert_eq!(deps_of_a[0].id(), Dep::from(&b).id());

    let deps_of_b = &graph.dependants[&Dep::from(&b).id()];
    assert_eq!(deps_of_b.len(), 1);
    assert_eq!(deps_of_b[0].id(), Dep::from(&root).id());
  }

  #[test]
  fn diamond_is_expanded_once() {
    let a = target("a");
    let b = Arc::new(BuildTarget::new("true", "/tmp/b").with_deps("A", [Dep::from(&a)]));
    let c = Arc::new(BuildTarget::new("true", "/tmp/c").with_deps("A", [Dep::from(&a)]));
    let d = Arc::new(BuildTarget::new("true", "/tmp/d").with_deps("BC", [Dep::from(&b), Dep::from(&c)]));
    let root = Arc::new(AliasTarget::new("x").with_deps("D", [Dep::from(&d)]));
    let graph = build(std::slice::from_ref(&root));

    assert_eq!(graph.node_count, 5);
    // a is a leaf exactly once even though two parents reference it.
    assert_eq!(leaf_ids(&graph), vec![Dep::from(&a).id()]);
    // ...and has both parents recorded as dependants.
    let parents: Vec<NodeId> = graph.dependants[&Dep::from(&a).id()].iter().map(Dep::id).collect();
    assert_eq!(parents.len(), 2);
    assert!(parents.contains(&Dep::from(&b).id()));
    assert!(parents.contains(&Dep::from(&c).id()));
  }

  #[test]
  fn repeated_occurrence_records_dependant_twice() {
    let a = target("a");
    let root = Arc::new(AliasTarget::new("x").with_deps("F", [Dep::from(&a), Dep::from(&a)]));
    let graph = build(std::slice::from_ref(&root));

    assert_eq!(graph.node_count, 2);
    assert_eq!(graph.dependants[&Dep::from(&a).id()].len(), 2);
    assert_eq!(Dep::from(&root).dep_count(), 2);
  }

  #[test]
  fn file_dependencies_are_leaves() {
    let src = Path::new("/tmp/main.c");
    let obj = Arc::new(BuildTarget::new("cc $SRC", "/tmp/main.o").with_deps("SRC", [Dep::from(src)]));
    let root = Arc::new(AliasTarget::new("build").with_deps("OBJ", [Dep::from(&obj)]));
    let graph = build(std::slice::from_ref(&root));

    assert_eq!(graph.node_count, 3);
    assert_eq!(leaf_ids(&graph), vec![NodeId::File(src.to_path_buf())]);
  }

  #[test]
  fn duplicate_root_request_is_deduplicated() {
    let root = Arc::new(AliasTarget::new("x").with_cmd("true"));
    let graph = build(&[root.clone(), root.clone()]);
    assert_eq!(graph.node_count, 1);
    assert_eq!(graph.leaves.len(), 1);
  }

  #[test]
  fn shared_root_also_referenced_as_dependency() {
    let inner = Arc::new(AliasTarget::new("inner").with_cmd("true"));
    let outer = Arc::new(AliasTarget::new("outer").with_deps("D", [Dep::from(&inner)]));
    let graph = build(&[inner.clone(), outer.clone()]);

    // inner appears once, as a leaf, with outer as its only dependant.
    assert_eq!(graph.node_count, 2);
    assert_eq!(graph.leaves.len(), 1);
    assert_eq!(graph.dependants[&Dep::from(&inner).id()].len(), 1);
  }
}
