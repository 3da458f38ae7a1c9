//! Configuration and error types for toolchain execution.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::{ENV_CARGO, ENV_TAR};

/// Errors that can occur while running tasks.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The external command exited unsuccessfully.
  #[error("`{command}` failed ({})", exit_status(.code))]
  CommandFailed { command: String, code: Option<i32> },

  /// The external command could not be started.
  #[error("failed to spawn `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  /// Entering a project directory failed.
  #[error("failed to enter {}: {source}", .path.display())]
  WorkingDirectory {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// No task or file target with this name exists.
  #[error("unknown task: {0}")]
  UnknownTask(String),

  /// I/O error while preparing an output location.
  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "terminated by signal".to_string(),
  }
}

/// Configuration for toolchain invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteConfig {
  /// Program used for build, test, clean and doc.
  pub cargo: String,

  /// Program used to bundle release artifacts.
  pub tar: String,

  /// Forward `--verbose` to the toolchain.
  pub verbose: bool,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      cargo: "cargo".to_string(),
      tar: "tar".to_string(),
      verbose: false,
    }
  }
}

impl ExecuteConfig {
  /// Read overrides from the environment.
  ///
  /// - `QUARRY_CARGO`, falling back to `CARGO` (set when running as a cargo subcommand)
  /// - `QUARRY_TAR`
  ///
  /// Relative program paths such as `./tools/cargo` are resolved against the
  /// current directory here, since tasks later run inside project directories.
  pub fn from_env(verbose: bool) -> Self {
    let defaults = Self::default();
    let cargo = non_empty_var(ENV_CARGO)
      .or_else(|| non_empty_var("CARGO"))
      .map(resolve_program)
      .unwrap_or(defaults.cargo);
    let tar = non_empty_var(ENV_TAR).map(resolve_program).unwrap_or(defaults.tar);

    Self { cargo, tar, verbose }
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Make a relative path with more than one component absolute. Bare names are left for `PATH` lookup.
fn resolve_program(program: String) -> String {
  let path = Path::new(&program);
  if path.has_root() || path.components().count() < 2 {
    return program;
  }
  match std::path::absolute(path) {
    Ok(absolute) => absolute.to_string_lossy().into_owned(),
    Err(_) => program,
  }
}
