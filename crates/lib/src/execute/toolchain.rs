//! Process boundary to the external toolchain.

use std::fmt;
use std::io;
use std::process::Command;

use tracing::debug;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Runs invocations in the current working directory and reports their exit code.
///
/// `Ok(None)` means the process ended without an exit code (killed by a signal).
pub trait CommandRunner {
  fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// Spawns real processes, inheriting stdio so toolchain output reaches the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
    debug!(command = %invocation, "spawning process");
    let status = Command::new(&invocation.program).args(&invocation.args).status()?;
    Ok(status.code())
  }
}
