use anyhow::{Result, bail};

use super::{Session, run_and_report};

pub fn cmd_package(session: &Session) -> Result<()> {
  let task = session.task_name("package")?;
  if session.workspace.tasks.get(&task).is_none() {
    bail!("{} has no release binaries to package", session.project_name());
  }
  run_and_report(session, &task, false)
}
