//! Running tasks against the external toolchain.
//!
//! [`Runner`] walks a task's prerequisites depth-first, skips tasks whose
//! outputs are current, and hands the rest to a [`BuildExecutor`], which shells
//! out through a [`CommandRunner`] inside the owning project's directory.

mod dir;
mod executor;
mod runner;
mod toolchain;
mod types;

pub use dir::DirGuard;
pub use executor::{BuildExecutor, CleanScope};
pub use runner::{RunOptions, RunReport, Runner};
pub use toolchain::{CommandRunner, Invocation, SystemRunner};
pub use types::{ExecuteConfig, ExecuteError};
