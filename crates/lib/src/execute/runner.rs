//! Sequential, dependency-first task evaluation.
//!
//! A task's prerequisites run before the task itself, each at most once per
//! run. A task whose outputs are newer than its inputs is skipped. The first
//! failure propagates to the caller and nothing after it runs.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use super::executor::{BuildExecutor, CleanScope};
use super::toolchain::CommandRunner;
use super::types::{ExecuteConfig, ExecuteError};
use crate::project::{ProjectGraph, ProjectId};
use crate::staleness;
use crate::task::{Action, Prerequisite, Task, TaskGraph};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
  /// Run tasks even when their outputs are up to date.
  pub force: bool,

  /// Clean the whole dependency closure in one call instead of package by package.
  pub clean_dependencies: bool,
}

/// What happened during a run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub executed: Vec<String>,
  pub up_to_date: Vec<String>,
}

pub struct Runner<'a> {
  projects: &'a ProjectGraph,
  tasks: &'a TaskGraph,
  executor: BuildExecutor<'a>,
  options: RunOptions,
  visited: HashSet<String>,
  report: RunReport,
}

impl<'a> Runner<'a> {
  pub fn new(
    projects: &'a ProjectGraph,
    tasks: &'a TaskGraph,
    config: &'a ExecuteConfig,
    runner: &'a mut dyn CommandRunner,
    options: RunOptions,
  ) -> Self {
    Self {
      projects,
      tasks,
      executor: BuildExecutor::new(config, runner),
      options,
      visited: HashSet::new(),
      report: RunReport::default(),
    }
  }

  /// Run a task by name, or the task producing a file target.
  pub fn run(&mut self, target: &str) -> Result<(), ExecuteError> {
    let tasks = self.tasks;
    let task = tasks
      .resolve(target)
      .ok_or_else(|| ExecuteError::UnknownTask(target.to_string()))?;
    self.run_task(task)
  }

  pub fn report(&self) -> &RunReport {
    &self.report
  }

  pub fn into_report(self) -> RunReport {
    self.report
  }

  fn run_task(&mut self, task: &'a Task) -> Result<(), ExecuteError> {
    if !self.visited.insert(task.name.clone()) {
      return Ok(());
    }

    for prerequisite in &task.prerequisites {
      self.run_prerequisite(prerequisite)?;
    }

    if !self.options.force && !staleness::needed(task) {
      info!(task = %task.name, "up to date");
      self.report.up_to_date.push(task.name.clone());
      return Ok(());
    }

    info!(task = %task.name, "running task");
    self.execute(task)?;
    self.report.executed.push(task.name.clone());
    Ok(())
  }

  fn run_prerequisite(&mut self, prerequisite: &'a Prerequisite) -> Result<(), ExecuteError> {
    let tasks = self.tasks;
    match prerequisite {
      Prerequisite::Task(name) => {
        let task = tasks
          .get(name)
          .ok_or_else(|| ExecuteError::UnknownTask(name.clone()))?;
        self.run_task(task)
      }
      Prerequisite::File(path) => match tasks.file_target(path).and_then(|name| tasks.get(name)) {
        Some(task) => self.run_task(task),
        None => {
          debug!(path = %path.display(), "no task produces prerequisite");
          Ok(())
        }
      },
    }
  }

  fn execute(&mut self, task: &Task) -> Result<(), ExecuteError> {
    let projects = self.projects;
    let dir = &projects.project(task.project).path;
    match &task.action {
      Action::Build { profile, artifact } => self.executor.build(dir, *profile, artifact),
      Action::Test => self.executor.test(dir),
      Action::Clean => {
        let scope = self.clean_scope(task.project);
        self.executor.clean(dir, &scope)
      }
      Action::Doc => self.executor.doc(dir),
      Action::Package { archive, files } => self.executor.package(dir, archive, files),
    }
  }

  /// Either one transitive clean, or one package-scoped clean for the project and each direct subproject.
  fn clean_scope(&self, id: ProjectId) -> CleanScope {
    if self.options.clean_dependencies {
      return CleanScope::Transitive;
    }

    let mut packages = vec![self.projects.project(id).name().to_string()];
    for &sub in self.projects.subprojects(id) {
      let name = self.projects.project(sub).name();
      if !packages.iter().any(|p| p == name) {
        packages.push(name.to_string());
      }
    }
    CleanScope::Packages(packages)
  }
}
