use anyhow::Result;

use super::{Session, run_and_report};

pub fn cmd_doc(session: &Session) -> Result<()> {
  let task = session.task_name("doc")?;
  run_and_report(session, &task, false)
}
