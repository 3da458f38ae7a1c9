//! Test utilities for quarry-lib.
//!
//! Project fixtures on disk and a toolchain double that records invocations.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::execute::{CommandRunner, Invocation};

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// Write a `Cargo.toml` at `dir` with local-path dependencies given as `(name, path)`.
pub fn write_manifest(dir: &Path, name: &str, deps: &[(&str, &str)]) {
  let mut manifest = format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\n\n[dependencies]\n", name);
  for (dep, path) in deps {
    manifest.push_str(&format!("{} = {{ path = \"{}\" }}\n", dep, path));
  }
  write_file(&dir.join("Cargo.toml"), &manifest);
}

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, time: SystemTime) {
  File::options()
    .write(true)
    .open(path)
    .and_then(|file| file.set_modified(time))
    .unwrap_or_else(|e| panic!("failed to set mtime of {}: {}", path.display(), e));
}

/// One recorded toolchain call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
  pub cwd: PathBuf,
  pub program: String,
  pub args: Vec<String>,
}

type Hook = Box<dyn FnMut(&Invocation)>;

/// Records every invocation with the working directory it ran in.
#[derive(Default)]
pub struct RecordingRunner {
  pub calls: Vec<RecordedCall>,
  exit_code: Option<i32>,
  fail: bool,
  hook: Option<Hook>,
}

impl RecordingRunner {
  /// A runner whose every invocation exits with `code`.
  pub fn failing(code: i32) -> Self {
    Self {
      exit_code: Some(code),
      fail: true,
      ..Self::default()
    }
  }

  /// Run `hook` on each successful invocation, e.g. to simulate toolchain output.
  pub fn with_hook(hook: impl FnMut(&Invocation) + 'static) -> Self {
    Self {
      hook: Some(Box::new(hook)),
      ..Self::default()
    }
  }

  /// Invocations rendered as command lines.
  pub fn commands(&self) -> Vec<String> {
    self
      .calls
      .iter()
      .map(|call| Invocation::new(call.program.clone()).args(call.args.clone()).to_string())
      .collect()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
    let cwd = dunce::canonicalize(std::env::current_dir()?)?;
    self.calls.push(RecordedCall {
      cwd,
      program: invocation.program.clone(),
      args: invocation.args.clone(),
    });

    if self.fail {
      return Ok(self.exit_code);
    }
    if let Some(hook) = self.hook.as_mut() {
      hook(invocation);
    }
    Ok(Some(0))
  }
}
