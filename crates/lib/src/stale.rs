//! Incremental rebuild decision for file-producing targets.
//!
//! Staleness is evaluated lazily, at the moment a target becomes ready to
//! run, against fresh filesystem metadata. By then every file-producing
//! dependency has finished its own command, so its modification time reflects
//! this run.

use std::fs;
use std::io;
use std::time::SystemTime;

use tracing::debug;

use crate::target::{BuildTarget, Dep};

/// Decide whether `target`'s command can be skipped.
///
/// A target is up to date iff its output exists, it has at least one
/// dependency, none of its dependencies is an alias, and no dependency file
/// is newer than the output. A target without dependencies has nothing to
/// compare against and is always rebuilt.
pub fn up_to_date(target: &BuildTarget) -> io::Result<bool> {
  let out_time = match fs::metadata(&target.output) {
    Ok(meta) => meta.modified()?,
    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(err) => return Err(err),
  };
  if !target.has_deps() {
    return Ok(false);
  }
  for deps in target.depends.values() {
    for dep in deps {
      match dep {
        // An alias has no timestamp to compare; assume it invalidates.
        Dep::Alias(_) => return Ok(false),
        Dep::File(path) => {
          if modified(path)? > out_time {
            return Ok(false);
          }
        }
        Dep::Build(dep_target) => {
          if modified(&dep_target.output)? > out_time {
            return Ok(false);
          }
        }
      }
    }
  }
  debug!(output = %target.output.display(), "up to date");
  Ok(true)
}

fn modified(path: &std::path::Path) -> io::Result<SystemTime> {
  fs::metadata(path)?.modified()
}
