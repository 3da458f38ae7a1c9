use anyhow::Result;

use quarry_lib::task::Profile;

use super::{Session, run_and_report};

pub fn cmd_build(session: &Session, profile: Profile) -> Result<()> {
  let task = session.task_name(&format!("build:{}", profile))?;
  run_and_report(session, &task, false)
}
