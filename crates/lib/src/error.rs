//! Error types for project configuration and build execution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or running a build.
///
/// All variants are unrecoverable at node granularity: once one is observed
/// the run is failed, no new work is dispatched, and already-running commands
/// are drained for bookkeeping only.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Two aliases were registered under the same name.
  #[error("target \"{0}\" defined multiple times")]
  DuplicateTarget(String),

  /// A requested target name is not registered.
  #[error("unknown target \"{0}\"")]
  UnknownTarget(String),

  /// A placeholder matched no group, no `OUTPUT` applicability, and no
  /// variable.
  #[error("unset variable \"${0}\"")]
  UnsetVariable(String),

  /// A file dependency did not exist when it became ready.
  #[error("file dependency \"{}\" does not exist", .0.display())]
  MissingFileDep(PathBuf),

  /// A dispatched command returned a nonzero status.
  #[error("target \"{target}\" failed (exit code {code:?})")]
  TargetFailed { target: String, code: Option<i32> },

  /// A build command succeeded but its declared output does not exist.
  #[error("expected output \"{}\" to exist after its command succeeded", .0.display())]
  MissingOutput(PathBuf),

  /// The run ended with nodes whose dependencies can never finish.
  #[error("dependency cycle detected")]
  CycleDetected,

  /// The run was aborted by an external interrupt.
  #[error("interrupt")]
  Interrupted,

  /// A worker task failed outside command execution.
  #[error("worker task failed: {0}")]
  Worker(String),

  /// I/O error while checking staleness or spawning a command.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
