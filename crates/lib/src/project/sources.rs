//! Source-set discovery for a single project.
//!
//! Follows the cargo directory convention:
//! - `src/main.rs` is the default binary, named after the package
//! - `src/bin/<name>.rs` and `src/bin/<name>/main.rs` are additional binaries
//! - `src/lib.rs` is the library
//!
//! Every `.rs` file under `src/`, plus the manifest, is an input of the project.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::consts::{BIN_DIR, LIB_FILE, MAIN_FILE, MANIFEST_FILE, SOURCE_DIR, SOURCE_EXT};

/// An independently buildable executable target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEntrypoint {
  pub name: String,
  pub path: PathBuf,
}

/// The files a project contributes on its own, without its subprojects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
  /// Manifest plus every implementation source under `src/`.
  pub files: BTreeSet<PathBuf>,

  /// Binary targets, sorted by name.
  pub binaries: Vec<BinaryEntrypoint>,

  /// Library entry file, if the project has one.
  pub library: Option<PathBuf>,
}

impl SourceSet {
  /// Scan `project_dir` for sources and entrypoints.
  pub fn scan(project_dir: &Path, package_name: &str) -> Self {
    let source_dir = project_dir.join(SOURCE_DIR);

    let mut files = BTreeSet::new();
    files.insert(project_dir.join(MANIFEST_FILE));
    files.extend(implementation_sources(&source_dir));

    let binaries = binary_entrypoints(&source_dir, package_name);
    let library = Some(source_dir.join(LIB_FILE)).filter(|path| path.is_file());

    debug!(
      project = %project_dir.display(),
      files = files.len(),
      binaries = binaries.len(),
      library = library.is_some(),
      "scanned sources"
    );

    Self {
      files,
      binaries,
      library,
    }
  }
}

fn is_source_file(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == SOURCE_EXT)
}

/// Every `.rs` file below `source_dir`. Unreadable entries are skipped.
fn implementation_sources(source_dir: &Path) -> Vec<PathBuf> {
  if !source_dir.is_dir() {
    return Vec::new();
  }

  WalkDir::new(source_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(err) => {
        debug!(error = %err, "skipping unreadable source entry");
        None
      }
    })
    .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
    .map(|entry| entry.into_path())
    .collect()
}

fn binary_entrypoints(source_dir: &Path, package_name: &str) -> Vec<BinaryEntrypoint> {
  let mut binaries = Vec::new();

  let main = source_dir.join(MAIN_FILE);
  if main.is_file() {
    binaries.push(BinaryEntrypoint {
      name: package_name.to_string(),
      path: main,
    });
  }

  let bin_dir = source_dir.join(BIN_DIR);
  let entries = match std::fs::read_dir(&bin_dir) {
    Ok(entries) => entries,
    Err(_) => return binaries,
  };

  let mut extra = Vec::new();
  for entry in entries.filter_map(|e| e.ok()) {
    let path = entry.path();
    let name = if path.is_file() && is_source_file(&path) {
      path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
    } else if path.join(MAIN_FILE).is_file() {
      path.file_name().map(|name| name.to_string_lossy().into_owned())
    } else {
      None
    };

    if let Some(name) = name {
      let path = if path.is_dir() { path.join(MAIN_FILE) } else { path };
      extra.push(BinaryEntrypoint { name, path });
    }
  }
  extra.sort_by(|a, b| a.name.cmp(&b.name));

  for bin in extra {
    if binaries.iter().any(|existing| existing.name == bin.name) {
      debug!(name = %bin.name, "ignoring binary that shadows an existing target");
      continue;
    }
    binaries.push(bin);
  }

  binaries
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::write_file;
  use tempfile::TempDir;

  #[test]
  fn manifest_is_always_a_source() {
    let temp = TempDir::new().unwrap();
    let set = SourceSet::scan(temp.path(), "empty");

    assert_eq!(set.files.len(), 1);
    assert!(set.files.contains(&temp.path().join("Cargo.toml")));
    assert!(set.binaries.is_empty());
    assert!(set.library.is_none());
  }

  #[test]
  fn collects_nested_sources_only() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("src/lib.rs"), "");
    write_file(&temp.path().join("src/net/tracker/mod.rs"), "");
    write_file(&temp.path().join("src/notes.md"), "");
    write_file(&temp.path().join("benches/b.rs"), "");

    let set = SourceSet::scan(temp.path(), "filament");

    assert!(set.files.contains(&temp.path().join("src/lib.rs")));
    assert!(set.files.contains(&temp.path().join("src/net/tracker/mod.rs")));
    assert!(!set.files.contains(&temp.path().join("src/notes.md")));
    assert!(!set.files.contains(&temp.path().join("benches/b.rs")));
    assert_eq!(set.library, Some(temp.path().join("src/lib.rs")));
  }

  #[test]
  fn discovers_binaries() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("src/main.rs"), "");
    write_file(&temp.path().join("src/bin/mogilefsd.rs"), "");
    write_file(&temp.path().join("src/bin/filament-cli.rs"), "");
    write_file(&temp.path().join("src/bin/tool/main.rs"), "");
    write_file(&temp.path().join("src/bin/README"), "");

    let set = SourceSet::scan(temp.path(), "filament");
    let names: Vec<_> = set.binaries.iter().map(|b| b.name.as_str()).collect();

    assert_eq!(names, vec!["filament", "filament-cli", "mogilefsd", "tool"]);
    assert_eq!(set.binaries[3].path, temp.path().join("src/bin/tool/main.rs"));
  }

  #[test]
  fn bin_shadowing_package_name_is_ignored() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("src/main.rs"), "");
    write_file(&temp.path().join("src/bin/filament.rs"), "");

    let set = SourceSet::scan(temp.path(), "filament");

    assert_eq!(set.binaries.len(), 1);
    assert_eq!(set.binaries[0].path, temp.path().join("src/main.rs"));
  }
}
