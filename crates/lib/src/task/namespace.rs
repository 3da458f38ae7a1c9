//! Task namespace identifiers.
//!
//! A namespace is derived from a project's package name (root) or from its path
//! relative to the root (subprojects). Runs of characters outside
//! `[A-Za-z0-9]` collapse into a single `_`, and separators at either end are
//! dropped. Case is preserved. [`NamespaceAllocator`] then guarantees that no
//! two projects share an identifier.

use std::collections::HashSet;

pub const SEPARATOR: char = '_';

/// Collapse every maximal run of non-alphanumeric characters in `raw` into one separator.
pub fn sanitize(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut pending_separator = false;

  for c in raw.chars() {
    if c.is_ascii_alphanumeric() {
      if pending_separator && !out.is_empty() {
        out.push(SEPARATOR);
      }
      pending_separator = false;
      out.push(c);
    } else {
      pending_separator = true;
    }
  }

  if out.is_empty() {
    out.push(SEPARATOR);
  }
  out
}

/// Hands out unique namespaces, suffixing `_2`, `_3`, ... on collision.
#[derive(Debug, Default)]
pub struct NamespaceAllocator {
  taken: HashSet<String>,
}

impl NamespaceAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn allocate(&mut self, raw: &str) -> String {
    let base = sanitize(raw);
    if self.taken.insert(base.clone()) {
      return base;
    }

    let mut n = 2;
    loop {
      let candidate = format!("{}{}{}", base, SEPARATOR, n);
      if self.taken.insert(candidate.clone()) {
        return candidate;
      }
      n += 1;
    }
  }
}
