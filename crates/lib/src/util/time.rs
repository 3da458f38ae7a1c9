//! Modification-time lookups that fold filesystem errors into absence.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

/// Last-modified time of `path`, or `None` if it cannot be inspected.
pub fn modified(path: &Path) -> Option<SystemTime> {
  match std::fs::metadata(path).and_then(|meta| meta.modified()) {
    Ok(time) => Some(time),
    Err(err) => {
      trace!(path = %path.display(), error = %err, "no modification time");
      None
    }
  }
}

/// Last-modified time of `path`, with missing or unreadable files reported as the epoch.
pub fn modified_or_epoch(path: &Path) -> SystemTime {
  modified(path).unwrap_or(UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn missing_file_is_epoch() {
    let temp = TempDir::new().unwrap();
    assert_eq!(modified_or_epoch(&temp.path().join("nope")), UNIX_EPOCH);
  }

  #[test]
  fn existing_file_is_after_epoch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("file");
    std::fs::write(&path, "x").unwrap();
    assert!(modified_or_epoch(&path) > UNIX_EPOCH);
  }
}
