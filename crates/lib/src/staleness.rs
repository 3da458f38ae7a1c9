//! Timestamp-based staleness.
//!
//! A task is needed when its newest input is newer than its oldest output:
//! inputs take the maximum modification time, outputs the minimum. Missing
//! files count as the epoch, so a missing input never forces a rebuild on its
//! own while a missing output always does.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::task::{Output, Task};
use crate::util::time::{modified, modified_or_epoch};

/// Whether `task` must run.
pub fn needed(task: &Task) -> bool {
  let Some(output) = output_timestamp(&task.output) else {
    debug!(task = %task.name, "output missing");
    return true;
  };

  let input = input_timestamp(task);
  let needed = input > output;
  debug!(task = %task.name, needed, "evaluated staleness");
  needed
}

/// Newest modification time across the declared inputs.
pub fn input_timestamp(task: &Task) -> SystemTime {
  task
    .inputs
    .iter()
    .map(|path| modified_or_epoch(path))
    .max()
    .unwrap_or(UNIX_EPOCH)
}

/// Oldest modification time across the declared outputs, or `None` when nothing exists to compare.
///
/// Tasks without a declared output have nothing that can be up to date.
pub fn output_timestamp(output: &Output) -> Option<SystemTime> {
  match output {
    Output::Artifact(path) => modified(path),
    Output::Directory(dir) => oldest_file_in(dir),
    Output::None => None,
  }
}

/// Minimum modification time over the regular files directly inside `dir`.
fn oldest_file_in(dir: &Path) -> Option<SystemTime> {
  let entries = match std::fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) => {
      debug!(dir = %dir.display(), error = %err, "output directory unreadable");
      return None;
    }
  };

  entries
    .filter_map(|entry| entry.ok())
    .filter(|entry| entry.file_type().is_ok_and(|ty| ty.is_file()))
    .filter_map(|entry| modified(&entry.path()))
    .min()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;
  use std::path::PathBuf;
  use std::time::Duration;

  use crate::project::ProjectId;
  use crate::task::Action;
  use crate::util::testutil::{set_mtime, write_file};
  use tempfile::TempDir;

  fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_600_000_000 + secs)
  }

  fn task(inputs: &[&Path], output: Output) -> Task {
    Task {
      name: "p:build:debug".to_string(),
      project: ProjectId::new(0),
      description: String::new(),
      action: Action::Doc,
      inputs: inputs.iter().map(|p| p.to_path_buf()).collect::<BTreeSet<PathBuf>>(),
      output,
      prerequisites: Vec::new(),
    }
  }

  fn file_at(dir: &Path, name: &str, secs: u64) -> PathBuf {
    let path = dir.join(name);
    write_file(&path, name);
    set_mtime(&path, at(secs));
    path
  }

  #[test]
  fn missing_artifact_is_needed() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 10);

    assert!(needed(&task(&[&src], Output::Artifact(temp.path().join("app")))));
  }

  #[test]
  fn artifact_newer_than_inputs_is_not_needed() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 10);
    let out = file_at(temp.path(), "app", 20);

    assert!(!needed(&task(&[&src], Output::Artifact(out))));
  }

  #[test]
  fn any_newer_input_makes_it_needed() {
    let temp = TempDir::new().unwrap();
    let old = file_at(temp.path(), "a.rs", 10);
    let new = file_at(temp.path(), "b.rs", 30);
    let out = file_at(temp.path(), "app", 20);

    assert!(needed(&task(&[&old, &new], Output::Artifact(out))));
  }

  #[test]
  fn equal_timestamps_are_not_needed() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 10);
    let out = file_at(temp.path(), "app", 10);

    assert!(!needed(&task(&[&src], Output::Artifact(out))));
  }

  #[test]
  fn missing_input_counts_as_epoch() {
    let temp = TempDir::new().unwrap();
    let gone = temp.path().join("gone.rs");
    let out = file_at(temp.path(), "app", 10);
    let t = task(&[&gone], Output::Artifact(out));

    assert_eq!(input_timestamp(&t), UNIX_EPOCH);
    assert!(!needed(&t));
  }

  #[test]
  fn directory_uses_oldest_file() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 20);
    let out_dir = temp.path().join("target/debug");
    file_at(&out_dir, "app", 30);
    file_at(&out_dir, ".cargo-lock", 10);
    // Nested files are not direct children and do not count.
    file_at(&out_dir.join("deps"), "old.rlib", 1);

    assert_eq!(output_timestamp(&Output::Directory(out_dir.clone())), Some(at(10)));
    assert!(needed(&task(&[&src], Output::Directory(out_dir))));
  }

  #[test]
  fn directory_newer_than_inputs_is_not_needed() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 5);
    let out_dir = temp.path().join("target/debug");
    file_at(&out_dir, "app", 30);
    file_at(&out_dir, "app.d", 10);

    assert!(!needed(&task(&[&src], Output::Directory(out_dir))));
  }

  #[test]
  fn empty_or_missing_directory_is_needed() {
    let temp = TempDir::new().unwrap();
    let src = file_at(temp.path(), "main.rs", 5);
    let out_dir = temp.path().join("target/debug");

    assert!(needed(&task(&[&src], Output::Directory(out_dir.clone()))));
    std::fs::create_dir_all(&out_dir).unwrap();
    assert!(needed(&task(&[&src], Output::Directory(out_dir))));
  }

  #[test]
  fn no_output_is_always_needed() {
    assert!(needed(&task(&[], Output::None)));
  }
}
