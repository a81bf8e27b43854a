//! A small build orchestrator.
//!
//! Declare file-producing targets and named aliases with grouped
//! dependencies, then run the reachable graph concurrently. Commands are
//! shell templates with `$NAME` placeholders; file-producing targets are
//! skipped when their output is newer than every dependency.
//!
//! ```no_run
//! use rmk_lib::{AliasTarget, BuildTarget, Dep, Project, RunOptions};
//! use std::sync::Arc;
//!
//! let mut project = Project::new();
//! project.set_var("CC", "cc");
//! let obj = Arc::new(
//!   BuildTarget::new("$CC -c $SRC -o $OUTPUT", "main.o")
//!     .with_deps("SRC", [Dep::from(std::path::PathBuf::from("main.c"))]),
//! );
//! project.register(
//!   AliasTarget::new("build")
//!     .with_help("compile everything")
//!     .with_deps("OBJS", [Dep::from(&obj)]),
//! )?;
//! project.run(&RunOptions { targets: vec!["build".into()], ..Default::default() })?;
//! # Ok::<(), rmk_lib::BuildError>(())
//! ```

pub mod error;
pub mod exec;
pub mod graph;
pub mod project;
pub mod shell;
pub mod stale;
pub mod subst;
pub mod target;
pub mod vars;

pub use error::BuildError;
pub use exec::{RunOptions, RunReport};
pub use project::Project;
pub use target::{AliasTarget, BuildTarget, Dep, DepGroups, NodeId};
pub use vars::VarStore;
