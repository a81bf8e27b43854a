//! Concurrent build execution.
//!
//! A single coordinator task owns all scheduling state; worker tasks only run
//! shell commands and report back. Readiness is tracked with per-node
//! pending-dependency counters initialized lazily from occurrence counts, so
//! they line up with the reverse-dependency index: each occurrence of a
//! dependency decrements its dependant once.
//!
//! On the first failure no new commands are dispatched, but commands already
//! running are drained and their completions are still bookkept.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::BuildError;
use crate::graph::{self, Graph};
use crate::shell;
use crate::stale;
use crate::subst;
use crate::target::{AliasTarget, Dep, NodeId};
use crate::vars::VarStore;

/// Options for one build run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Maximum number of concurrently running commands; 0 means unbounded.
  pub jobs: usize,
  /// Names of the aliases to build.
  pub targets: Vec<String>,
  /// Shell to run commands through instead of the platform default.
  pub shell: Option<String>,
}

/// Summary of a finished run.
#[derive(Debug, Default)]
pub struct RunReport {
  /// Every command dispatched, fully expanded, in dispatch order.
  pub commands: Vec<String>,
  /// File-producing targets skipped because their output was current.
  pub fresh: usize,
  /// Nodes that reached completion, including skipped and command-less ones.
  pub completed: usize,
}

struct Scheduler<'a> {
  vars: &'a VarStore,
  dependants: HashMap<NodeId, Vec<Dep>>,
  deps_left: HashMap<NodeId, usize>,
  tasks: JoinSet<Result<Dep, BuildError>>,
  permits: Option<Arc<Semaphore>>,
  shell: Option<String>,
  failure: Option<BuildError>,
  report: RunReport,
}

impl<'a> Scheduler<'a> {
  fn new(graph: &mut Graph, vars: &'a VarStore, opts: &RunOptions) -> Self {
    Self {
      vars,
      dependants: std::mem::take(&mut graph.dependants),
      deps_left: HashMap::new(),
      tasks: JoinSet::new(),
      permits: (opts.jobs > 0).then(|| Arc::new(Semaphore::new(opts.jobs))),
      shell: opts.shell.clone(),
      failure: None,
      report: RunReport::default(),
    }
  }

  /// Act on a node whose dependencies have all finished.
  ///
  /// Returns the node itself when it finished without dispatching a command,
  /// so the caller can propagate readiness immediately.
  fn start(&mut self, node: Dep) -> Result<Option<Dep>, BuildError> {
    match &node {
      Dep::File(path) => {
        if !path.try_exists()? {
          return Err(BuildError::MissingFileDep(path.clone()));
        }
        Ok(Some(node))
      }
      Dep::Build(target) => {
        if stale::up_to_date(target)? {
          self.report.fresh += 1;
          return Ok(Some(node));
        }
        let cmd = subst::expand(&target.cmd, Some(&target.output), &target.depends, self.vars)?;
        self.dispatch(node.clone(), cmd);
        Ok(None)
      }
      Dep::Alias(alias) => {
        let Some(template) = &alias.cmd else {
          return Ok(Some(node));
        };
        let cmd = subst::expand(template, None, &alias.depends, self.vars)?;
        self.dispatch(node.clone(), cmd);
        Ok(None)
      }
    }
  }

  fn dispatch(&mut self, node: Dep, cmd: String) {
    self.report.commands.push(cmd.clone());
    let permits = self.permits.clone();
    let shell_override = self.shell.clone();
    self.tasks.spawn(async move {
      let _permit = match &permits {
        Some(sem) => Some(sem.acquire().await.unwrap()),
        None => None,
      };
      println!("{cmd}");
      let status = shell::run(&cmd, shell_override.as_deref()).await?;
      if !status.success() {
        return Err(BuildError::TargetFailed {
          target: node.to_string(),
          code: status.code(),
        });
      }
      if let Dep::Build(target) = &node
        && !tokio::fs::try_exists(&target.output).await?
      {
        return Err(BuildError::MissingOutput(target.output.clone()));
      }
      Ok(node)
    });
  }

  /// Record `first` as finished and cascade readiness through every node
  /// that finishes without a command of its own.
  fn complete(&mut self, first: Dep) {
    let mut finished = VecDeque::from([first]);
    while let Some(node) = finished.pop_front() {
      self.report.completed += 1;
      debug!(node = %node, "completed");
      let Some(parents) = self.dependants.get(&node.id()).cloned() else {
        continue;
      };
      for parent in parents {
        let remaining = {
          let counter = self
            .deps_left
            .entry(parent.id())
            .or_insert_with(|| parent.dep_count());
          *counter -= 1;
          *counter
        };
        if remaining == 0 && self.failure.is_none() {
          match self.start(parent) {
            Ok(Some(done)) => finished.push_back(done),
            Ok(None) => {}
            Err(err) => self.fail(err),
          }
        }
      }
    }
  }

  /// Record the first failure; later ones are logged and dropped.
  fn fail(&mut self, err: BuildError) {
    if self.failure.is_none() {
      error!(%err, "build failed");
      self.failure = Some(err);
    } else {
      debug!(%err, "subsequent failure");
    }
  }
}

/// Build the graph reachable from `roots` and run it to completion.
pub(crate) async fn execute(
  roots: &[Arc<AliasTarget>],
  vars: &VarStore,
  opts: &RunOptions,
) -> Result<RunReport, BuildError> {
  let mut graph = graph::build(roots);
  let node_count = graph.node_count;
  info!(nodes = node_count, jobs = opts.jobs, "starting build");

  let mut sched = Scheduler::new(&mut graph, vars, opts);
  for leaf in graph.leaves {
    match sched.start(leaf) {
      Ok(Some(done)) => sched.complete(done),
      Ok(None) => {}
      Err(err) => {
        sched.fail(err);
        break;
      }
    }
  }

  let ctrl_c = tokio::signal::ctrl_c();
  tokio::pin!(ctrl_c);
  while !sched.tasks.is_empty() {
    tokio::select! {
      _ = &mut ctrl_c => {
        warn!("interrupted, aborting");
        return Err(BuildError::Interrupted);
      }
      joined = sched.tasks.join_next() => match joined {
        Some(Ok(Ok(node))) => sched.complete(node),
        Some(Ok(Err(err))) => sched.fail(err),
        Some(Err(join_err)) => sched.fail(BuildError::Worker(join_err.to_string())),
        None => break,
      },
    }
  }

  if let Some(err) = sched.failure {
    return Err(err);
  }
  if sched.report.completed < node_count {
    // Some nodes never became ready; only a cycle can cause that.
    return Err(BuildError::CycleDetected);
  }
  info!(
    commands = sched.report.commands.len(),
    fresh = sched.report.fresh,
    "build finished"
  );
  Ok(sched.report)
}
