//! Toolchain invocations for a single project.
//!
//! Every call enters the project directory through a [`DirGuard`] and maps a
//! non-zero exit status to [`ExecuteError::CommandFailed`]. There is no retry.

use std::path::{Path, PathBuf};

use tracing::info;

use super::dir::DirGuard;
use super::toolchain::{CommandRunner, Invocation};
use super::types::{ExecuteConfig, ExecuteError};
use crate::task::{Artifact, Profile};

/// Which packages a clean covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanScope {
  /// One clean of the whole target directory, dependencies included.
  Transitive,
  /// One `clean -p` per package, in order.
  Packages(Vec<String>),
}

pub struct BuildExecutor<'a> {
  config: &'a ExecuteConfig,
  runner: &'a mut dyn CommandRunner,
}

impl<'a> BuildExecutor<'a> {
  pub fn new(config: &'a ExecuteConfig, runner: &'a mut dyn CommandRunner) -> Self {
    Self { config, runner }
  }

  pub fn build(&mut self, project: &Path, profile: Profile, artifact: &Artifact) -> Result<(), ExecuteError> {
    let mut invocation = self.cargo("build");
    if profile == Profile::Release {
      invocation = invocation.arg("--release");
    }
    invocation = match artifact {
      Artifact::WholeProject => invocation,
      Artifact::Binary(name) => invocation.args(["--bin", name.as_str()]),
      Artifact::Library => invocation.arg("--lib"),
    };
    let invocation = self.verbose(invocation);
    self.invoke(project, invocation)
  }

  pub fn test(&mut self, project: &Path) -> Result<(), ExecuteError> {
    let invocation = self.verbose(self.cargo("test"));
    self.invoke(project, invocation)
  }

  pub fn clean(&mut self, project: &Path, scope: &CleanScope) -> Result<(), ExecuteError> {
    match scope {
      CleanScope::Transitive => {
        let invocation = self.verbose(self.cargo("clean"));
        self.invoke(project, invocation)
      }
      CleanScope::Packages(packages) => {
        for package in packages {
          let invocation = self.verbose(self.cargo("clean").args(["-p", package.as_str()]));
          self.invoke(project, invocation)?;
        }
        Ok(())
      }
    }
  }

  pub fn doc(&mut self, project: &Path) -> Result<(), ExecuteError> {
    let invocation = self.verbose(self.cargo("doc").arg("--no-deps"));
    self.invoke(project, invocation)
  }

  /// Bundle `files` into a gzipped tarball at `archive`, each stored under its file name.
  pub fn package(&mut self, project: &Path, archive: &Path, files: &[PathBuf]) -> Result<(), ExecuteError> {
    if let Some(parent) = archive.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let flags = if self.config.verbose { "-czvf" } else { "-czf" };
    let mut invocation = Invocation::new(&self.config.tar)
      .arg(flags)
      .arg(archive.to_string_lossy());
    for file in files {
      let dir = file.parent().unwrap_or(project);
      let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
      invocation = invocation.arg("-C").arg(dir.to_string_lossy()).arg(name);
    }

    self.invoke(project, invocation)
  }

  fn cargo(&self, subcommand: &str) -> Invocation {
    Invocation::new(&self.config.cargo).arg(subcommand)
  }

  fn verbose(&self, invocation: Invocation) -> Invocation {
    if self.config.verbose {
      invocation.arg("--verbose")
    } else {
      invocation
    }
  }

  fn invoke(&mut self, dir: &Path, invocation: Invocation) -> Result<(), ExecuteError> {
    let _guard = DirGuard::enter(dir).map_err(|source| ExecuteError::WorkingDirectory {
      path: dir.to_path_buf(),
      source,
    })?;

    info!(command = %invocation, dir = %dir.display(), "running toolchain");
    let code = self.runner.run(&invocation).map_err(|source| ExecuteError::Spawn {
      command: invocation.to_string(),
      source,
    })?;

    if code != Some(0) {
      return Err(ExecuteError::CommandFailed {
        command: invocation.to_string(),
        code,
      });
    }
    Ok(())
  }
}
