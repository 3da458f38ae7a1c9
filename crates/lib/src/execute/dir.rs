//! Scoped working-directory changes.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Restores the previous working directory when dropped.
///
/// The working directory is process-wide, so every change goes through a guard
/// and is undone on every exit path, including errors and panics.
#[derive(Debug)]
pub struct DirGuard {
  previous: PathBuf,
}

impl DirGuard {
  /// Enter `dir`, or return `None` if it already is the current directory.
  pub fn enter(dir: &Path) -> io::Result<Option<Self>> {
    let previous = std::env::current_dir()?;
    let current = dunce::canonicalize(&previous).unwrap_or_else(|_| previous.clone());
    let target = dunce::canonicalize(dir)?;
    if current == target {
      return Ok(None);
    }

    std::env::set_current_dir(&target)?;
    debug!(from = %previous.display(), to = %target.display(), "entered directory");
    Ok(Some(Self { previous }))
  }
}

impl Drop for DirGuard {
  fn drop(&mut self) {
    if let Err(err) = std::env::set_current_dir(&self.previous) {
      warn!(dir = %self.previous.display(), error = %err, "failed to restore working directory");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  fn cwd() -> PathBuf {
    dunce::canonicalize(std::env::current_dir().unwrap()).unwrap()
  }

  #[test]
  #[serial]
  fn restores_on_drop() {
    let temp = TempDir::new().unwrap();
    let before = cwd();

    {
      let guard = DirGuard::enter(temp.path()).unwrap();
      assert!(guard.is_some());
      assert_eq!(cwd(), dunce::canonicalize(temp.path()).unwrap());
    }

    assert_eq!(cwd(), before);
  }

  #[test]
  #[serial]
  fn same_directory_is_a_no_op() {
    let here = cwd();
    assert!(DirGuard::enter(&here).unwrap().is_none());
    assert_eq!(cwd(), here);
  }

  #[test]
  #[serial]
  fn restores_after_panic() {
    let temp = TempDir::new().unwrap();
    let before = cwd();
    let dir = temp.path().to_path_buf();

    let result = std::panic::catch_unwind(move || {
      let _guard = DirGuard::enter(&dir).unwrap();
      panic!("boom");
    });

    assert!(result.is_err());
    assert_eq!(cwd(), before);
  }

  #[test]
  #[serial]
  fn missing_directory_is_an_error() {
    let temp = TempDir::new().unwrap();
    let before = cwd();
    assert!(DirGuard::enter(&temp.path().join("absent")).is_err());
    assert_eq!(cwd(), before);
  }
}
