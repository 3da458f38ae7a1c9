//! `quarry clean`.
//!
//! By default cleans the selected package and each direct subproject with one
//! `cargo clean -p` apiece; `--with-dependencies` cleans the whole target
//! directory in one call.

use anyhow::Result;

use super::{Session, run_and_report};

pub fn cmd_clean(session: &Session, with_dependencies: bool) -> Result<()> {
  let task = session.task_name("clean")?;
  run_and_report(session, &task, with_dependencies)
}
