//! Project graph discovery.
//!
//! Discovery runs in two phases:
//! 1. [`ProjectRegistry`] walks manifests from the root, registering exactly one
//!    [`ProjectNode`] per canonical path and linking local-path dependencies.
//! 2. [`ProjectRegistry::finish`] freezes the result into a [`ProjectGraph`] and
//!    computes every node's recursive source set once.
//!
//! After the second phase the graph is immutable and only answers queries.

mod registry;
mod sources;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::manifest::PackageManifest;

pub use registry::{DiscoveryError, ProjectRegistry};
pub use sources::{BinaryEntrypoint, SourceSet};

/// Stable handle to a project within one run.
pub type ProjectId = NodeIndex;

/// One buildable project.
#[derive(Debug, Clone)]
pub struct ProjectNode {
  /// Canonical project directory; the registry key.
  pub path: PathBuf,

  pub manifest: PackageManifest,

  /// Direct local-path dependencies, in manifest order.
  pub subprojects: Vec<ProjectId>,

  /// Files and entrypoints contributed by this project alone.
  pub sources: SourceSet,
}

impl ProjectNode {
  pub fn name(&self) -> &str {
    &self.manifest.name
  }

  pub fn own_sources(&self) -> &BTreeSet<PathBuf> {
    &self.sources.files
  }

  pub fn binary_entrypoints(&self) -> &[BinaryEntrypoint] {
    &self.sources.binaries
  }

  pub fn library_entrypoint(&self) -> Option<&Path> {
    self.sources.library.as_deref()
  }
}

/// Immutable project graph produced by discovery.
#[derive(Debug)]
pub struct ProjectGraph {
  graph: DiGraph<ProjectNode, ()>,
  by_path: HashMap<PathBuf, ProjectId>,
  root: ProjectId,
  recursive: HashMap<ProjectId, BTreeSet<PathBuf>>,
}

impl ProjectGraph {
  pub(crate) fn new(graph: DiGraph<ProjectNode, ()>, by_path: HashMap<PathBuf, ProjectId>, root: ProjectId) -> Self {
    let recursive = graph
      .node_indices()
      .map(|id| (id, collect_recursive_sources(&graph, id)))
      .collect();

    Self {
      graph,
      by_path,
      root,
      recursive,
    }
  }

  /// Discover the project rooted at `path` (a project directory or its manifest).
  pub fn discover(path: &Path) -> Result<Self, DiscoveryError> {
    let mut registry = ProjectRegistry::new();
    let root = registry.register_or_get(path)?;
    Ok(registry.finish(root))
  }

  /// The invocation root.
  pub fn root(&self) -> ProjectId {
    self.root
  }

  pub fn project(&self, id: ProjectId) -> &ProjectNode {
    &self.graph[id]
  }

  /// Look up a project by directory. The path is matched after canonicalization.
  pub fn find(&self, path: &Path) -> Option<ProjectId> {
    let canonical = dunce::canonicalize(path).ok()?;
    self.by_path.get(&canonical).copied()
  }

  pub fn projects(&self) -> impl Iterator<Item = (ProjectId, &ProjectNode)> {
    self.graph.node_indices().map(|id| (id, &self.graph[id]))
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  pub fn subprojects(&self, id: ProjectId) -> &[ProjectId] {
    &self.graph[id].subprojects
  }

  /// Own sources of `id` united with the recursive sources of every subproject.
  pub fn recursive_sources(&self, id: ProjectId) -> &BTreeSet<PathBuf> {
    &self.recursive[&id]
  }

  /// `id` followed by every project reachable from it, depth-first.
  pub fn closure(&self, id: ProjectId) -> Vec<ProjectId> {
    let mut dfs = Dfs::new(&self.graph, id);
    let mut out = Vec::new();
    while let Some(next) = dfs.next(&self.graph) {
      out.push(next);
    }
    out
  }
}

/// Union of own sources over everything reachable from `id`.
///
/// Each reachable project is visited once, so shared subprojects and cycles
/// contribute their files a single time.
fn collect_recursive_sources(graph: &DiGraph<ProjectNode, ()>, id: ProjectId) -> BTreeSet<PathBuf> {
  let mut files = BTreeSet::new();
  let mut dfs = Dfs::new(graph, id);
  while let Some(next) = dfs.next(graph) {
    files.extend(graph[next].sources.files.iter().cloned());
  }
  files
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{write_file, write_manifest};
  use tempfile::TempDir;

  /// root -> {left, right}, left -> shared, right -> shared
  fn diamond() -> (TempDir, ProjectGraph) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_manifest(root, "app", &[("left", "left"), ("right", "right")]);
    write_file(&root.join("src/main.rs"), "");
    write_manifest(&root.join("left"), "left", &[("shared", "../shared")]);
    write_file(&root.join("left/src/lib.rs"), "");
    write_manifest(&root.join("right"), "right", &[("shared", "../shared")]);
    write_file(&root.join("right/src/lib.rs"), "");
    write_manifest(&root.join("shared"), "shared", &[]);
    write_file(&root.join("shared/src/lib.rs"), "");

    let graph = ProjectGraph::discover(root).unwrap();
    (temp, graph)
  }

  fn id_of(graph: &ProjectGraph, name: &str) -> ProjectId {
    graph.projects().find(|(_, p)| p.name() == name).unwrap().0
  }

  #[test]
  fn diamond_registers_shared_project_once() {
    let (_temp, graph) = diamond();

    assert_eq!(graph.len(), 4);
    let left = id_of(&graph, "left");
    let right = id_of(&graph, "right");
    assert_eq!(graph.subprojects(left), graph.subprojects(right));
  }

  #[test]
  fn recursive_sources_is_union_of_subprojects() {
    let (_temp, graph) = diamond();
    let root = graph.root();

    let mut expected: BTreeSet<PathBuf> = graph.project(root).own_sources().clone();
    for &sub in graph.subprojects(root) {
      expected.extend(graph.recursive_sources(sub).iter().cloned());
    }
    assert_eq!(graph.recursive_sources(root), &expected);

    // Reverse traversal order gives the same set.
    let mut reversed: BTreeSet<PathBuf> = BTreeSet::new();
    for &sub in graph.subprojects(root).iter().rev() {
      reversed.extend(graph.recursive_sources(sub).iter().cloned());
    }
    reversed.extend(graph.project(root).own_sources().iter().cloned());
    assert_eq!(graph.recursive_sources(root), &reversed);
  }

  #[test]
  fn shared_sources_contribute_once() {
    let (temp, graph) = diamond();
    let root = graph.recursive_sources(graph.root());
    let shared_lib = dunce::canonicalize(temp.path().join("shared/src/lib.rs")).unwrap();

    assert_eq!(root.iter().filter(|p| **p == shared_lib).count(), 1);
    // 4 manifests + main.rs + 3 lib.rs
    assert_eq!(root.len(), 8);
  }

  #[test]
  fn closure_visits_each_project_once() {
    let (_temp, graph) = diamond();
    let closure = graph.closure(graph.root());

    assert_eq!(closure.len(), 4);
    assert_eq!(closure[0], graph.root());
  }

  #[test]
  fn find_by_noncanonical_path() {
    let (temp, graph) = diamond();
    let found = graph.find(&temp.path().join("left/../shared")).unwrap();
    assert_eq!(graph.project(found).name(), "shared");
  }
}
