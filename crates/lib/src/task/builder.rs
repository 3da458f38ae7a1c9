use std::collections::{BTreeSet, HashSet};
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::namespace::NamespaceAllocator;
use super::{Action, Artifact, Output, Prerequisite, Profile, Task, TaskGraph};
use crate::consts::{DOC_DIR, PACKAGE_DIR, TARGET_DIR};
use crate::project::{ProjectGraph, ProjectId, ProjectNode};

/// Prefix of binary artifact tasks, e.g. `app:build:bin:appctl:debug`.
pub const BINARY_LABEL: &str = "bin";

/// Label of library artifact tasks, e.g. `app:build:lib:debug`.
pub const LIBRARY_LABEL: &str = "lib";

/// Walks a [`ProjectGraph`] once and emits every project's tasks.
pub struct TaskGraphBuilder<'a> {
  projects: &'a ProjectGraph,
  graph: TaskGraph,
  visited: HashSet<ProjectId>,
  namespaces: NamespaceAllocator,
}

impl<'a> TaskGraphBuilder<'a> {
  pub fn new(projects: &'a ProjectGraph) -> Self {
    Self {
      projects,
      graph: TaskGraph::default(),
      visited: HashSet::new(),
      namespaces: NamespaceAllocator::new(),
    }
  }

  pub fn build(mut self) -> TaskGraph {
    let root = self.projects.root();
    self.visit(root);
    debug!(tasks = self.graph.len(), projects = self.visited.len(), "built task graph");
    self.graph
  }

  fn visit(&mut self, id: ProjectId) {
    if !self.visited.insert(id) {
      return;
    }

    let namespace = self.namespaces.allocate(&self.namespace_source(id));
    self.graph.set_namespace(id, namespace.clone());
    self.emit_project(id, &namespace);

    for &sub in self.projects.subprojects(id) {
      self.visit(sub);
    }
  }

  /// Package name for the root, path relative to the root for everything else.
  fn namespace_source(&self, id: ProjectId) -> String {
    let root = self.projects.root();
    let project = self.projects.project(id);
    if id == root {
      return project.name().to_string();
    }

    let root_dir = &self.projects.project(root).path;
    match project.path.strip_prefix(root_dir) {
      Ok(relative) => relative.to_string_lossy().into_owned(),
      Err(_) => project.path.to_string_lossy().into_owned(),
    }
  }

  fn emit_project(&mut self, id: ProjectId, ns: &str) {
    let projects = self.projects;
    let project = projects.project(id);
    let inputs = projects.recursive_sources(id);

    for profile in Profile::ALL {
      let output_dir = profile_dir(&project.path, profile);

      self.graph.insert(Task {
        name: format!("{}:build:{}", ns, profile),
        project: id,
        description: format!("Build {} ({})", project.name(), profile),
        action: Action::Build {
          profile,
          artifact: Artifact::WholeProject,
        },
        inputs: inputs.clone(),
        output: Output::Directory(output_dir.clone()),
        prerequisites: Vec::new(),
      });

      for bin in project.binary_entrypoints() {
        let path = output_dir.join(format!("{}{}", bin.name, EXE_SUFFIX));
        let artifact = Artifact::Binary(bin.name.clone());
        self.emit_artifact(id, ns, project, profile, artifact, path, inputs);
      }

      if project.library_entrypoint().is_some() {
        let path = output_dir.join(library_file(project.name()));
        self.emit_artifact(id, ns, project, profile, Artifact::Library, path, inputs);
      }
    }

    self.graph.insert(Task {
      name: format!("{}:test", ns),
      project: id,
      description: format!("Test {}", project.name()),
      action: Action::Test,
      inputs: BTreeSet::new(),
      output: Output::None,
      prerequisites: Vec::new(),
    });

    self.graph.insert(Task {
      name: format!("{}:clean", ns),
      project: id,
      description: format!("Clean {}", project.name()),
      action: Action::Clean,
      inputs: BTreeSet::new(),
      output: Output::None,
      prerequisites: Vec::new(),
    });

    self.graph.insert(Task {
      name: format!("{}:doc", ns),
      project: id,
      description: format!("Document {}", project.name()),
      action: Action::Doc,
      inputs: inputs.clone(),
      output: Output::Directory(project.path.join(TARGET_DIR).join(DOC_DIR)),
      prerequisites: Vec::new(),
    });

    if id == projects.root() {
      self.emit_package(id, ns, project);
    }
  }

  fn emit_artifact(
    &mut self,
    id: ProjectId,
    ns: &str,
    project: &ProjectNode,
    profile: Profile,
    artifact: Artifact,
    path: PathBuf,
    inputs: &BTreeSet<PathBuf>,
  ) {
    let label = artifact_label(&artifact);
    let name = format!("{}:build:{}:{}", ns, label, profile);
    let inserted = self.graph.insert(Task {
      name: name.clone(),
      project: id,
      description: format!("Build {} `{}` ({})", project.name(), label, profile),
      action: Action::Build { profile, artifact },
      inputs: inputs.clone(),
      output: Output::Artifact(path.clone()),
      prerequisites: Vec::new(),
    });

    if inserted {
      self.graph.insert_file_target(path, &name);
    }
  }

  /// Bundles the root's release binaries. Skipped for projects without binaries.
  fn emit_package(&mut self, id: ProjectId, ns: &str, project: &ProjectNode) {
    let release_dir = profile_dir(&project.path, Profile::Release);
    let files: Vec<PathBuf> = project
      .binary_entrypoints()
      .iter()
      .map(|bin| release_dir.join(format!("{}{}", bin.name, EXE_SUFFIX)))
      .collect();

    if files.is_empty() {
      return;
    }

    let archive = project
      .path
      .join(TARGET_DIR)
      .join(PACKAGE_DIR)
      .join(format!("{}-{}.tar.gz", project.name(), project.manifest.version));

    self.graph.insert(Task {
      name: format!("{}:package", ns),
      project: id,
      description: format!("Package {} release binaries", project.name()),
      action: Action::Package {
        archive: archive.clone(),
        files: files.clone(),
      },
      inputs: files.iter().cloned().collect(),
      output: Output::Artifact(archive),
      prerequisites: files.into_iter().map(Prerequisite::File).collect(),
    });
  }
}

/// Task-name segment of an artifact. Binaries and the library live under different prefixes, so a binary named `lib` cannot shadow the library task.
pub fn artifact_label(artifact: &Artifact) -> String {
  match artifact {
    Artifact::WholeProject => String::new(),
    Artifact::Binary(name) => format!("{}:{}", BINARY_LABEL, name),
    Artifact::Library => LIBRARY_LABEL.to_string(),
  }
}

/// Toolchain output directory for `profile`.
pub fn profile_dir(project_dir: &Path, profile: Profile) -> PathBuf {
  project_dir.join(TARGET_DIR).join(profile.as_str())
}

/// File name of the library artifact for a package.
pub fn library_file(package_name: &str) -> String {
  format!("lib{}.rlib", package_name.replace('-', "_"))
}
