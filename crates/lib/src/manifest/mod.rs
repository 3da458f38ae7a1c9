//! Project manifest reading.
//!
//! A manifest declares a project's identity and its dependencies. Only
//! dependencies carrying a local `path` take part in the project graph;
//! version-only entries resolve through the registry and are ignored here.

mod types;

pub use types::*;
