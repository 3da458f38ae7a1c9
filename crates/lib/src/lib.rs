//! quarry-lib: project discovery and incremental task evaluation for quarry
//!
//! The crate is organised around two immutable graphs built once per run:
//! - `ProjectGraph`: every project reachable from the root through local-path
//!   dependencies, one node per canonical path, with recursive source sets
//! - `TaskGraph`: namespaced build/test/clean/doc/package tasks and the file
//!   targets that map artifacts back to the tasks producing them
//!
//! `execute::Runner` evaluates tasks against the graphs, consulting
//! `staleness` and invoking the external toolchain only when needed.

pub mod consts;
pub mod execute;
pub mod manifest;
pub mod project;
pub mod staleness;
pub mod task;
pub mod util;
pub mod workspace;
