//! A discovered project graph together with its task graph.

use std::path::Path;

use thiserror::Error;

use crate::project::{DiscoveryError, ProjectGraph, ProjectId};
use crate::task::TaskGraph;

#[derive(Debug, Error)]
pub enum WorkspaceError {
  #[error(transparent)]
  Discovery(#[from] DiscoveryError),

  #[error("no project with namespace `{0}`")]
  UnknownProject(String),
}

pub struct Workspace {
  pub projects: ProjectGraph,
  pub tasks: TaskGraph,
}

impl Workspace {
  /// Discover the project at `path`, which may name a directory or its manifest file.
  pub fn load(path: &Path) -> Result<Self, WorkspaceError> {
    let projects = ProjectGraph::discover(path)?;
    let tasks = TaskGraph::from_projects(&projects);
    Ok(Self { projects, tasks })
  }

  /// The root project, or the project whose namespace is `namespace`.
  pub fn select(&self, namespace: Option<&str>) -> Result<ProjectId, WorkspaceError> {
    match namespace {
      None => Ok(self.projects.root()),
      Some(ns) => self
        .tasks
        .project_for_namespace(ns)
        .ok_or_else(|| WorkspaceError::UnknownProject(ns.to_string())),
    }
  }

  /// Fully qualified name of `task` in `project`'s namespace.
  pub fn task_name(&self, project: ProjectId, task: &str) -> Option<String> {
    self.tasks.qualified(project, task)
  }
}
