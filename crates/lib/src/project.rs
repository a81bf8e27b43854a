//! Project declaration and entry point.
//!
//! A [`Project`] collects named aliases and variables, then runs requested
//! aliases on a dedicated tokio runtime. Declaration is synchronous plain
//! Rust; only [`Project::run`] enters async execution.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::BuildError;
use crate::exec::{self, RunOptions, RunReport};
use crate::target::AliasTarget;
use crate::vars::VarStore;

/// A declared build: named aliases plus the variable store.
#[derive(Debug, Default)]
pub struct Project {
  aliases: BTreeMap<String, Arc<AliasTarget>>,
  vars: VarStore,
}

impl Project {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set a variable unless it already has a value.
  ///
  /// First writer wins: apply external overrides before project defaults and
  /// the defaults will not clobber them. Returns true if the value stuck.
  pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
    self.vars.set(name, value)
  }

  /// Look up a variable value.
  pub fn var(&self, name: &str) -> Option<&str> {
    self.vars.get(name)
  }

  /// Register an alias under its name.
  ///
  /// Returns the shared handle to reference the alias from other targets'
  /// dependency groups. Names must be unique.
  pub fn register(&mut self, alias: AliasTarget) -> Result<Arc<AliasTarget>, BuildError> {
    if self.aliases.contains_key(&alias.name) {
      return Err(BuildError::DuplicateTarget(alias.name));
    }
    let alias = Arc::new(alias);
    self.aliases.insert(alias.name.clone(), alias.clone());
    Ok(alias)
  }

  /// Look up a registered alias by name.
  pub fn get(&self, name: &str) -> Option<&Arc<AliasTarget>> {
    self.aliases.get(name)
  }

  /// Registered aliases in name order.
  pub fn aliases(&self) -> impl Iterator<Item = &Arc<AliasTarget>> {
    self.aliases.values()
  }

  /// A table of alias names and their help lines, for display.
  pub fn target_summary(&self) -> String {
    let width = self.aliases.keys().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for alias in self.aliases.values() {
      let help = alias.help.as_deref().unwrap_or("");
      let _ = writeln!(out, "  {:width$}  {}", alias.name, help);
    }
    out.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
  }

  /// Run the aliases named in `opts.targets`.
  ///
  /// Every name is resolved before anything runs, so an unknown target fails
  /// without side effects.
  pub fn run(&self, opts: &RunOptions) -> Result<RunReport, BuildError> {
    let mut roots = Vec::with_capacity(opts.targets.len());
    for name in &opts.targets {
      let alias = self
        .aliases
        .get(name)
        .ok_or_else(|| BuildError::UnknownTarget(name.clone()))?;
      roots.push(alias.clone());
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(exec::execute(&roots, &self.vars, opts))
  }
}
