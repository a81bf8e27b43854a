//! Target definitions and node identity.
//!
//! A build is declared as a set of nodes of three kinds:
//!
//! - [`BuildTarget`] — produces one output file via a command.
//! - [`AliasTarget`] — a uniquely named node, optionally running a command,
//!   otherwise a pure grouping of dependencies.
//! - A plain file path — an externally supplied input this system does not
//!   build.
//!
//! Dependencies are grouped under names; a group name can be referenced from
//! the owning node's command template and expands to the space-joined textual
//! form of its members, in declared order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Named, ordered dependency groups of a node.
///
/// Group names are unordered relative to each other; the sequence within a
/// group is significant (it drives substitution output).
pub type DepGroups = BTreeMap<String, Vec<Dep>>;

/// A target that produces one file via a command.
///
/// Identity is the output path: two `BuildTarget`s are the same node iff
/// their output paths are equal. The command is only re-run when the output
/// is missing or older than a dependency.
#[derive(Debug, Clone)]
pub struct BuildTarget {
  /// Command template; `$OUTPUT` expands to the output path.
  pub cmd: String,
  /// The file this target produces.
  pub output: PathBuf,
  /// Dependency groups, referenced from `cmd` by group name.
  pub depends: DepGroups,
}

impl BuildTarget {
  pub fn new(cmd: impl Into<String>, output: impl Into<PathBuf>) -> Self {
    Self {
      cmd: cmd.into(),
      output: output.into(),
      depends: DepGroups::new(),
    }
  }

  /// Add a named dependency group.
  pub fn with_deps(mut self, group: impl Into<String>, deps: impl IntoIterator<Item = Dep>) -> Self {
    self.depends.insert(group.into(), deps.into_iter().collect());
    self
  }

  /// True if any dependency group is non-empty.
  pub fn has_deps(&self) -> bool {
    self.depends.values().any(|deps| !deps.is_empty())
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.output.display())
  }
}

/// A named target that does not produce a file.
///
/// An alias either runs a command, groups other nodes as dependencies, or
/// both. Identity is the name; names must be unique within a [`Project`].
///
/// [`Project`]: crate::project::Project
#[derive(Debug, Clone)]
pub struct AliasTarget {
  /// Unique name, also the identifier used on the command line.
  pub name: String,
  /// Optional command template.
  pub cmd: Option<String>,
  /// Dependency groups, referenced from `cmd` by group name.
  pub depends: DepGroups,
  /// Optional one-line description shown in the target table.
  pub help: Option<String>,
}

impl AliasTarget {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      cmd: None,
      depends: DepGroups::new(),
      help: None,
    }
  }

  pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
    self.cmd = Some(cmd.into());
    self
  }

  pub fn with_help(mut self, help: impl Into<String>) -> Self {
    self.help = Some(help.into());
    self
  }

  /// Add a named dependency group.
  pub fn with_deps(mut self, group: impl Into<String>, deps: impl IntoIterator<Item = Dep>) -> Self {
    self.depends.insert(group.into(), deps.into_iter().collect());
    self
  }

  /// True if any dependency group is non-empty.
  pub fn has_deps(&self) -> bool {
    self.depends.values().any(|deps| !deps.is_empty())
  }
}

impl fmt::Display for AliasTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// A node in the dependency graph.
///
/// Targets are shared via `Arc` so a node referenced from several dependency
/// groups is one node, expanded and executed at most once per run.
#[derive(Debug, Clone)]
pub enum Dep {
  /// An externally supplied file; must exist once it becomes ready.
  File(PathBuf),
  /// A file-producing target.
  Build(Arc<BuildTarget>),
  /// A named alias.
  Alias(Arc<AliasTarget>),
}

impl Dep {
  /// The identity key of this node, used for all graph maps and sets.
  pub fn id(&self) -> NodeId {
    match self {
      Dep::File(path) => NodeId::File(path.clone()),
      Dep::Build(target) => NodeId::Build(target.output.clone()),
      Dep::Alias(alias) => NodeId::Alias(alias.name.clone()),
    }
  }

  /// The dependency groups of this node, if it can have any.
  pub fn groups(&self) -> Option<&DepGroups> {
    match self {
      Dep::File(_) => None,
      Dep::Build(target) => Some(&target.depends),
      Dep::Alias(alias) => Some(&alias.depends),
    }
  }

  /// True if this node has at least one non-empty dependency group.
  /// A node without dependencies is a leaf and starts ready.
  pub fn has_deps(&self) -> bool {
    match self {
      Dep::File(_) => false,
      Dep::Build(target) => target.has_deps(),
      Dep::Alias(alias) => alias.has_deps(),
    }
  }

  /// Total count of dependency occurrences across all groups.
  ///
  /// Repeated entries count once per occurrence; this is the initial value
  /// of the node's pending-dependency counter.
  pub fn dep_count(&self) -> usize {
    self
      .groups()
      .map(|groups| groups.values().map(Vec::len).sum())
      .unwrap_or(0)
  }
}

impl fmt::Display for Dep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Dep::File(path) => write!(f, "{}", path.display()),
      Dep::Build(target) => write!(f, "{target}"),
      Dep::Alias(alias) => write!(f, "{alias}"),
    }
  }
}

impl From<&Arc<BuildTarget>> for Dep {
  fn from(target: &Arc<BuildTarget>) -> Self {
    Dep::Build(target.clone())
  }
}

impl From<Arc<BuildTarget>> for Dep {
  fn from(target: Arc<BuildTarget>) -> Self {
    Dep::Build(target)
  }
}

impl From<&Arc<AliasTarget>> for Dep {
  fn from(alias: &Arc<AliasTarget>) -> Self {
    Dep::Alias(alias.clone())
  }
}

impl From<Arc<AliasTarget>> for Dep {
  fn from(alias: Arc<AliasTarget>) -> Self {
    Dep::Alias(alias)
  }
}

impl From<PathBuf> for Dep {
  fn from(path: PathBuf) -> Self {
    Dep::File(path)
  }
}

impl From<&Path> for Dep {
  fn from(path: &Path) -> Self {
    Dep::File(path.to_path_buf())
  }
}

/// Explicit node identity.
///
/// A `BuildTarget` is identified by its output path, an `AliasTarget` by its
/// name, and a file dependency by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
  File(PathBuf),
  Build(PathBuf),
  Alias(String),
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NodeId::File(path) | NodeId::Build(path) => write!(f, "{}", path.display()),
      NodeId::Alias(name) => f.write_str(name),
    }
  }
}
