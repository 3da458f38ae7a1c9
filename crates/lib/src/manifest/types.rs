use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

/// Dependency tables that may declare local-path projects, in the order they are read.
const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Errors raised while reading a manifest or resolving its local dependencies.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found: {}", .path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read manifest {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid dependency '{name}' in {}: {reason}", .path.display())]
  InvalidDependency { path: PathBuf, name: String, reason: String },

  #[error("dependency '{name}' declared in {} points at missing project {}", .manifest.display(), .path.display())]
  MissingDependency {
    manifest: PathBuf,
    name: String,
    path: PathBuf,
  },
}

/// A single dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
  /// Key under which the dependency is declared.
  pub name: String,

  /// Local path, relative to the declaring project, when the entry has one.
  pub path: Option<PathBuf>,
}

impl Dependency {
  /// Only local-path dependencies are graph-relevant.
  pub fn is_local(&self) -> bool {
    self.path.is_some()
  }
}

/// Structured view of a project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
  pub name: String,
  pub version: String,
  pub dependencies: Vec<Dependency>,
}

impl PackageManifest {
  /// Dependencies that carry a local path, in declaration order.
  pub fn local_dependencies(&self) -> impl Iterator<Item = (&str, &Path)> {
    self
      .dependencies
      .iter()
      .filter_map(|dep| dep.path.as_deref().map(|path| (dep.name.as_str(), path)))
  }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
  package: RawPackage,
  #[serde(flatten)]
  rest: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
  name: String,
  version: String,
}

/// Read and parse the manifest at `path`.
pub fn read_manifest(path: &Path) -> Result<PackageManifest, ManifestError> {
  let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
    io::ErrorKind::NotFound => ManifestError::NotFound {
      path: path.to_path_buf(),
    },
    _ => ManifestError::Read {
      path: path.to_path_buf(),
      source,
    },
  })?;

  let manifest = parse_manifest(&content, path)?;
  debug!(
    path = %path.display(),
    name = %manifest.name,
    dependencies = manifest.dependencies.len(),
    "read manifest"
  );
  Ok(manifest)
}

/// Parse manifest text. `path` is only used for error reporting.
pub fn parse_manifest(content: &str, path: &Path) -> Result<PackageManifest, ManifestError> {
  let raw: RawManifest = toml::from_str(content).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  let mut dependencies = Vec::new();
  for table_name in DEPENDENCY_TABLES {
    let Some(value) = raw.rest.get(table_name) else {
      continue;
    };
    let Some(table) = value.as_table() else {
      return Err(ManifestError::InvalidDependency {
        path: path.to_path_buf(),
        name: table_name.to_string(),
        reason: "expected a table".to_string(),
      });
    };

    for (name, entry) in table {
      let dep = parse_dependency(name, entry, path)?;
      // The same crate listed in several tables is one edge.
      if dependencies.iter().any(|d: &Dependency| d.name == dep.name && d.path == dep.path) {
        continue;
      }
      trace!(name = %dep.name, local = dep.is_local(), table = table_name, "dependency");
      dependencies.push(dep);
    }
  }

  Ok(PackageManifest {
    name: raw.package.name,
    version: raw.package.version,
    dependencies,
  })
}

fn parse_dependency(name: &str, entry: &toml::Value, manifest: &Path) -> Result<Dependency, ManifestError> {
  match entry {
    toml::Value::String(_) => Ok(Dependency {
      name: name.to_string(),
      path: None,
    }),
    toml::Value::Table(table) => {
      let path = match table.get("path") {
        None => None,
        Some(toml::Value::String(path)) => Some(PathBuf::from(path)),
        Some(_) => {
          return Err(ManifestError::InvalidDependency {
            path: manifest.to_path_buf(),
            name: name.to_string(),
            reason: "`path` must be a string".to_string(),
          });
        }
      };
      Ok(Dependency {
        name: name.to_string(),
        path,
      })
    }
    other => Err(ManifestError::InvalidDependency {
      path: manifest.to_path_buf(),
      name: name.to_string(),
      reason: format!("expected a version string or a table, found {}", other.type_str()),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn parse(content: &str) -> Result<PackageManifest, ManifestError> {
    parse_manifest(content, Path::new("Cargo.toml"))
  }

  #[test]
  fn parses_identity() {
    let manifest = parse(
      r#"
[package]
name = "filament"
version = "0.3.1"
"#,
    )
    .unwrap();

    assert_eq!(manifest.name, "filament");
    assert_eq!(manifest.version, "0.3.1");
    assert!(manifest.dependencies.is_empty());
  }

  #[test]
  fn version_only_dependency_is_not_local() {
    let manifest = parse(
      r#"
[package]
name = "filament"
version = "0.3.1"

[dependencies]
log = "0.4"
mio = { version = "0.5", features = ["x"] }
"#,
    )
    .unwrap();

    assert_eq!(manifest.dependencies.len(), 2);
    assert!(manifest.dependencies.iter().all(|d| !d.is_local()));
    assert_eq!(manifest.local_dependencies().count(), 0);
  }

  #[test]
  fn local_dependencies_keep_declaration_order() {
    let manifest = parse(
      r#"
[package]
name = "filament"
version = "0.3.1"

[dependencies]
server = { path = "server" }
log = "0.4"
common = { path = "common", version = "0.1" }

[dev-dependencies]
client = { path = "client" }
"#,
    )
    .unwrap();

    let local: Vec<_> = manifest.local_dependencies().map(|(name, _)| name).collect();
    assert_eq!(local, vec!["server", "common", "client"]);
  }

  #[test]
  fn duplicate_across_tables_is_listed_once() {
    let manifest = parse(
      r#"
[package]
name = "filament"
version = "0.3.1"

[dependencies]
common = { path = "common" }

[dev-dependencies]
common = { path = "common" }
"#,
    )
    .unwrap();

    assert_eq!(manifest.dependencies.len(), 1);
  }

  #[test]
  fn missing_package_is_parse_error() {
    let result = parse("[dependencies]\nlog = \"0.4\"\n");
    assert!(matches!(result, Err(ManifestError::Parse { .. })));
  }

  #[test]
  fn missing_version_is_parse_error() {
    let result = parse("[package]\nname = \"x\"\n");
    assert!(matches!(result, Err(ManifestError::Parse { .. })));
  }

  #[test]
  fn malformed_toml_is_parse_error() {
    let result = parse("[package\nname = ");
    assert!(matches!(result, Err(ManifestError::Parse { .. })));
  }

  #[test]
  fn non_string_path_is_rejected() {
    let result = parse(
      r#"
[package]
name = "x"
version = "0.1.0"

[dependencies]
common = { path = 3 }
"#,
    );
    assert!(matches!(result, Err(ManifestError::InvalidDependency { name, .. }) if name == "common"));
  }

  #[test]
  fn read_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let result = read_manifest(&temp.path().join("Cargo.toml"));
    assert!(matches!(result, Err(ManifestError::NotFound { .. })));
  }

  #[test]
  fn read_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Cargo.toml");
    std::fs::write(&path, "[package]\nname = \"common\"\nversion = \"0.1.0\"\n").unwrap();

    let manifest = read_manifest(&path).unwrap();
    assert_eq!(manifest.name, "common");
  }
}
