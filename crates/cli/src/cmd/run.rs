use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Session, run_and_report};

/// Run a task by its full name, a name relative to the selected project, or the path of a file target.
pub fn cmd_run(session: &Session, target: &str) -> Result<()> {
  let target = resolve_target(session, target);
  run_and_report(session, &target, false)
}

fn resolve_target(session: &Session, target: &str) -> String {
  let tasks = &session.workspace.tasks;
  if tasks.get(target).is_some() {
    return target.to_string();
  }

  if let Ok(qualified) = session.task_name(target)
    && tasks.get(&qualified).is_some()
  {
    return qualified;
  }

  if let Some(path) = artifact_path(Path::new(target))
    && let Some(name) = tasks.file_target(&path)
  {
    return name.to_string();
  }

  target.to_string()
}

/// Absolute path of a possibly missing artifact, with its parent directory canonicalized when it exists.
fn artifact_path(path: &Path) -> Option<PathBuf> {
  let absolute = std::path::absolute(path).ok()?;
  let file_name = absolute.file_name()?;
  match absolute.parent().and_then(|parent| dunce::canonicalize(parent).ok()) {
    Some(parent) => Some(parent.join(file_name)),
    None => Some(absolute),
  }
}
