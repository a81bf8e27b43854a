//! The global variable store.
//!
//! Variables are plain name/value strings consulted during command expansion
//! when a placeholder matches neither `OUTPUT` nor a dependency group. The
//! store is populated during project setup and read-only once a run starts.

use std::collections::HashMap;

/// Name/value variable mapping with first-writer-wins semantics.
///
/// The first value written for a name sticks: a value supplied externally
/// (for example a `-D` override from the command line) is applied before the
/// project's own declarations and is never replaced by a later programmatic
/// default for the same name.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
  vars: HashMap<String, String>,
}

impl VarStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set a variable unless it already has a value.
  ///
  /// Returns true if the value was stored, false if an earlier writer won.
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
    let mut fresh = false;
    self.vars.entry(name.into()).or_insert_with(|| {
      fresh = true;
      value.into()
    });
    fresh
  }

  /// Look up a variable value.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_and_get() {
    let mut vars = VarStore::new();
    assert!(vars.set("CC", "gcc"));
    assert_eq!(vars.get("CC"), Some("gcc"));
    assert_eq!(vars.get("LD"), None);
  }

  #[test]
  fn first_writer_wins() {
    let mut vars = VarStore::new();
    // External override lands first, project default must not clobber it.
    assert!(vars.set("CC", "gcc-11"));
    assert!(!vars.set("CC", "cc"));
    assert_eq!(vars.get("CC"), Some("gcc-11"));
  }

  #[test]
  fn empty_value_is_still_a_value() {
    let mut vars = VarStore::new();
    vars.set("FLAGS", "");
    assert!(!vars.set("FLAGS", "-O2"));
    assert_eq!(vars.get("FLAGS"), Some(""));
  }
}
