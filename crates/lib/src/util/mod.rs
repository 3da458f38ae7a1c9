//! Shared utilities.
//!
//! Filesystem timestamp helpers and test fixtures.

pub mod time;

#[cfg(test)]
pub mod testutil;
