//! Per-invocation registry of discovered projects.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use petgraph::graph::DiGraph;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ProjectGraph, ProjectId, ProjectNode, SourceSet};
use crate::consts::MANIFEST_FILE;
use crate::manifest::{ManifestError, read_manifest};

#[derive(Debug, Error)]
pub enum DiscoveryError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("failed to resolve project path {}: {source}", .path.display())]
  Canonicalize {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Maps canonical project paths to their single [`ProjectNode`].
///
/// A node is inserted before its dependencies are followed, so a project that
/// (directly or transitively) depends on itself resolves to the node already
/// under construction instead of recursing forever.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
  graph: DiGraph<ProjectNode, ()>,
  by_path: HashMap<PathBuf, ProjectId>,
}

impl ProjectRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Return the project at `path`, discovering it and its local dependencies on first request.
  ///
  /// `path` may name either the project directory or its manifest file.
  pub fn register_or_get(&mut self, path: &Path) -> Result<ProjectId, DiscoveryError> {
    let dir = project_dir(path);
    let canonical = dunce::canonicalize(dir).map_err(|source| match source.kind() {
      io::ErrorKind::NotFound => DiscoveryError::Manifest(ManifestError::NotFound {
        path: dir.join(MANIFEST_FILE),
      }),
      _ => DiscoveryError::Canonicalize {
        path: dir.to_path_buf(),
        source,
      },
    })?;

    if let Some(&id) = self.by_path.get(&canonical) {
      return Ok(id);
    }

    let manifest_path = canonical.join(MANIFEST_FILE);
    let manifest = read_manifest(&manifest_path)?;
    let sources = SourceSet::scan(&canonical, &manifest.name);
    let locals: Vec<(String, PathBuf)> = manifest
      .local_dependencies()
      .map(|(name, path)| (name.to_string(), canonical.join(path)))
      .collect();

    let id = self.graph.add_node(ProjectNode {
      path: canonical.clone(),
      manifest,
      subprojects: Vec::new(),
      sources,
    });
    self.by_path.insert(canonical.clone(), id);
    debug!(project = %canonical.display(), "registered project");

    for (name, dep_dir) in locals {
      if !dep_dir.exists() {
        return Err(
          ManifestError::MissingDependency {
            manifest: manifest_path.clone(),
            name,
            path: dep_dir,
          }
          .into(),
        );
      }

      let child = self.register_or_get(&dep_dir)?;
      if child == id {
        warn!(project = %canonical.display(), dependency = %name, "project depends on itself; ignoring");
        continue;
      }
      if self.graph[id].subprojects.contains(&child) {
        continue;
      }
      self.graph.add_edge(id, child, ());
      self.graph[id].subprojects.push(child);
    }

    Ok(id)
  }

  pub fn get(&self, id: ProjectId) -> &ProjectNode {
    &self.graph[id]
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Freeze discovery into an immutable graph rooted at `root`.
  pub fn finish(self, root: ProjectId) -> ProjectGraph {
    ProjectGraph::new(self.graph, self.by_path, root)
  }
}

/// The directory a path names: itself, or the directory holding a manifest file.
fn project_dir(path: &Path) -> &Path {
  if path.file_name().is_none_or(|name| name != MANIFEST_FILE) {
    return path;
  }
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}
