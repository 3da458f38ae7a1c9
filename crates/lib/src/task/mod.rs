//! Namespaced operations derived from the project graph.
//!
//! Every project gets a namespace (see [`namespace`]) and a fixed family of
//! tasks under it:
//!
//! | task                         | output                                   |
//! |------------------------------|------------------------------------------|
//! | `<ns>:build:<profile>`       | every file in `target/<profile>/`        |
//! | `<ns>:build:bin:<name>:<profile>` | `target/<profile>/<name>`         |
//! | `<ns>:build:lib:<profile>`   | `target/<profile>/lib<name>.rlib`        |
//! | `<ns>:test`                  | none, always runs                        |
//! | `<ns>:clean`                 | none, always runs                        |
//! | `<ns>:doc`                   | every file in `target/doc/`              |
//! | `<root>:package`             | `target/package/<name>-<version>.tar.gz` |
//!
//! Artifact paths are also registered as file targets so that consumers can
//! depend on a concrete path rather than a task name.

mod builder;
pub mod namespace;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::project::ProjectId;

pub use builder::TaskGraphBuilder;

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
  Debug,
  Release,
}

impl Profile {
  pub const ALL: [Profile; 2] = [Profile::Debug, Profile::Release];

  pub fn as_str(self) -> &'static str {
    match self {
      Profile::Debug => "debug",
      Profile::Release => "release",
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Profile {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "debug" | "dev" => Ok(Profile::Debug),
      "release" => Ok(Profile::Release),
      other => Err(format!("unknown profile '{}': expected debug or release", other)),
    }
  }
}

/// What a build task produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Artifact {
  /// Every target of the project.
  WholeProject,
  /// One named executable.
  Binary(String),
  /// The project's library.
  Library,
}

/// Declared output of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Output {
  /// A single file.
  Artifact(PathBuf),
  /// Every regular file directly inside a directory.
  Directory(PathBuf),
  /// Nothing on disk; the task always runs.
  None,
}

/// The toolchain call a task stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  Build { profile: Profile, artifact: Artifact },
  Test,
  Clean,
  Doc,
  Package { archive: PathBuf, files: Vec<PathBuf> },
}

/// Something that must be up to date before a task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisite {
  Task(String),
  File(PathBuf),
}

/// One generated operation.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
  pub name: String,
  #[serde(skip)]
  pub project: ProjectId,
  pub description: String,
  #[serde(flatten)]
  pub action: Action,
  pub inputs: BTreeSet<PathBuf>,
  pub output: Output,
  pub prerequisites: Vec<Prerequisite>,
}

/// All tasks and file targets for one invocation.
#[derive(Debug, Default)]
pub struct TaskGraph {
  tasks: BTreeMap<String, Task>,
  file_targets: BTreeMap<PathBuf, String>,
  namespaces: HashMap<ProjectId, String>,
}

impl TaskGraph {
  /// Build the task graph for every project reachable from the root.
  pub fn from_projects(projects: &crate::project::ProjectGraph) -> Self {
    TaskGraphBuilder::new(projects).build()
  }

  /// Insert `task` unless a task with the same name exists. Returns whether it was inserted.
  pub(crate) fn insert(&mut self, task: Task) -> bool {
    if self.tasks.contains_key(&task.name) {
      return false;
    }
    self.tasks.insert(task.name.clone(), task);
    true
  }

  /// Register `path` as produced by `task`. The first registration wins.
  pub(crate) fn insert_file_target(&mut self, path: PathBuf, task: &str) -> bool {
    if self.file_targets.contains_key(&path) {
      return false;
    }
    self.file_targets.insert(path, task.to_string());
    true
  }

  pub(crate) fn set_namespace(&mut self, project: ProjectId, namespace: String) {
    self.namespaces.entry(project).or_insert(namespace);
  }

  pub fn get(&self, name: &str) -> Option<&Task> {
    self.tasks.get(name)
  }

  /// Name of the task producing the artifact at `path`.
  pub fn file_target(&self, path: &Path) -> Option<&str> {
    self.file_targets.get(path).map(String::as_str)
  }

  /// Resolve a task name or a file-target path.
  pub fn resolve(&self, target: &str) -> Option<&Task> {
    self
      .tasks
      .get(target)
      .or_else(|| self.file_target(Path::new(target)).and_then(|name| self.tasks.get(name)))
  }

  pub fn namespace(&self, project: ProjectId) -> Option<&str> {
    self.namespaces.get(&project).map(String::as_str)
  }

  /// Project owning `namespace`.
  pub fn project_for_namespace(&self, namespace: &str) -> Option<ProjectId> {
    self
      .namespaces
      .iter()
      .find(|(_, ns)| ns.as_str() == namespace)
      .map(|(&id, _)| id)
  }

  /// Fully qualified name of `task` within `project`'s namespace.
  pub fn qualified(&self, project: ProjectId, task: &str) -> Option<String> {
    self.namespace(project).map(|ns| format!("{}:{}", ns, task))
  }

  pub fn tasks(&self) -> impl Iterator<Item = &Task> {
    self.tasks.values()
  }

  pub fn file_targets(&self) -> impl Iterator<Item = (&Path, &str)> {
    self.file_targets.iter().map(|(path, name)| (path.as_path(), name.as_str()))
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }
}
