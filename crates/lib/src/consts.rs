//! Names and directory conventions shared across the crate.

/// Per-project manifest file.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Directory holding implementation sources, relative to a project root.
pub const SOURCE_DIR: &str = "src";

/// Directory of additional binaries, relative to [`SOURCE_DIR`].
pub const BIN_DIR: &str = "bin";

/// Extension of implementation source files.
pub const SOURCE_EXT: &str = "rs";

pub const MAIN_FILE: &str = "main.rs";
pub const LIB_FILE: &str = "lib.rs";

/// Toolchain output directory, relative to a project root.
pub const TARGET_DIR: &str = "target";
pub const DOC_DIR: &str = "doc";
pub const PACKAGE_DIR: &str = "package";

pub const ENV_CARGO: &str = "QUARRY_CARGO";
pub const ENV_TAR: &str = "QUARRY_TAR";
