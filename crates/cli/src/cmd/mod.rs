//! Subcommand implementations.
//!
//! Every subcommand works on a [`Session`]: the discovered workspace, the
//! project selected with `--project`, and the toolchain configuration.

mod build;
mod clean;
mod doc;
mod package;
mod run;
mod tasks;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use quarry_lib::execute::{ExecuteConfig, RunOptions, RunReport, Runner, SystemRunner};
use quarry_lib::project::ProjectId;
use quarry_lib::workspace::Workspace;

use crate::output::{count, format_duration, print_info, print_stat, print_success};

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use doc::cmd_doc;
pub use package::cmd_package;
pub use run::cmd_run;
pub use tasks::cmd_tasks;
pub use test::cmd_test;

pub struct Session {
  pub workspace: Workspace,
  pub project: ProjectId,
  /// Set when `--project` narrowed the session to one subproject.
  pub namespace: Option<String>,
  pub config: ExecuteConfig,
  pub force: bool,
}

impl Session {
  pub fn open(manifest_path: Option<&Path>, namespace: Option<&str>, verbose: bool, force: bool) -> Result<Self> {
    let path = manifest_path.unwrap_or(Path::new("."));
    let workspace =
      Workspace::load(path).with_context(|| format!("Failed to load project at {}", path.display()))?;
    let project = workspace.select(namespace)?;
    debug!(
      projects = workspace.projects.len(),
      tasks = workspace.tasks.len(),
      project = %workspace.projects.project(project).path.display(),
      "loaded workspace"
    );

    Ok(Self {
      workspace,
      project,
      namespace: namespace.map(str::to_string),
      config: ExecuteConfig::from_env(verbose),
      force,
    })
  }

  /// `task` qualified with the selected project's namespace.
  pub fn task_name(&self, task: &str) -> Result<String> {
    self
      .workspace
      .task_name(self.project, task)
      .with_context(|| format!("No namespace for project {}", self.project_name()))
  }

  pub fn project_name(&self) -> &str {
    self.workspace.projects.project(self.project).name()
  }

  /// Run `target` and its prerequisites against the real toolchain.
  pub fn execute(&self, target: &str, clean_dependencies: bool) -> Result<RunReport> {
    let options = RunOptions {
      force: self.force,
      clean_dependencies,
    };
    let mut system = SystemRunner;
    let mut runner = Runner::new(
      &self.workspace.projects,
      &self.workspace.tasks,
      &self.config,
      &mut system,
      options,
    );

    runner.run(target).with_context(|| format!("Task {} failed", target))?;
    Ok(runner.into_report())
  }
}

/// Run `target` and print what happened.
fn run_and_report(session: &Session, target: &str, clean_dependencies: bool) -> Result<()> {
  let start = Instant::now();
  let report = session.execute(target, clean_dependencies)?;

  if report.executed.is_empty() {
    print_info(&format!("{} is up to date", target));
  } else {
    print_success(&format!("{} complete", target));
  }
  print_stat("Executed", &count(report.executed.len(), "task"));
  print_stat("Up to date", &count(report.up_to_date.len(), "task"));
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}
