//! Command line entry point.
//!
//! Declares this repository's own maintenance targets and runs the ones
//! named on the command line. With no targets it prints the target table.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use rmk_lib::{AliasTarget, BuildError, Dep, Project, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rmk", version, about = "Run project maintenance targets")]
struct Options {
  /// Maximum number of commands to run at once; 0 means unbounded.
  #[arg(short, long, default_value_t = 0)]
  jobs: usize,

  /// Define a variable as NAME or NAME=VALUE; overrides project defaults.
  #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
  var: Vec<String>,

  /// Shell to run commands through instead of the platform default.
  #[arg(long)]
  shell: Option<String>,

  /// Targets to build.
  targets: Vec<String>,
}

fn split_define(define: &str) -> (&str, &str) {
  match define.split_once('=') {
    Some((name, value)) => (name, value),
    None => (define, ""),
  }
}

fn build_project(defines: &[String]) -> anyhow::Result<Project> {
  let mut project = Project::new();
  // Overrides first so project defaults cannot clobber them.
  for define in defines {
    let (name, value) = split_define(define);
    project.set_var(name, value);
  }
  project.set_var("CARGO", "cargo");

  let fmt = project
    .register(
      AliasTarget::new("fmt")
        .with_cmd("$CARGO fmt --all")
        .with_help("format the workspace"),
    )
    .context("registering fmt")?;
  project
    .register(
      AliasTarget::new("fmt-check")
        .with_cmd("$CARGO fmt --all --check")
        .with_help("verify formatting without rewriting"),
    )
    .context("registering fmt-check")?;
  let clippy = project
    .register(
      AliasTarget::new("clippy")
        .with_cmd("$CARGO clippy --workspace -- -D warnings")
        .with_help("lint the workspace"),
    )
    .context("registering clippy")?;
  let test = project
    .register(
      AliasTarget::new("test")
        .with_cmd("$CARGO test --workspace")
        .with_help("run all tests"),
    )
    .context("registering test")?;
  project
    .register(
      AliasTarget::new("check")
        .with_help("fmt, clippy and test")
        .with_deps("STEPS", [Dep::from(&fmt), Dep::from(&clippy), Dep::from(&test)]),
    )
    .context("registering check")?;
  Ok(project)
}

fn print_targets(project: &Project) {
  println!("targets:");
  println!("{}", project.target_summary());
}

fn exit_code(err: &BuildError) -> u8 {
  match err {
    BuildError::UnknownTarget(_) | BuildError::DuplicateTarget(_) => 2,
    BuildError::Interrupted => 130,
    _ => 1,
  }
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let options = Options::parse();
  tracing::debug!(?options, "parsed");
  let project = match build_project(&options.var) {
    Ok(project) => project,
    Err(err) => {
      eprintln!("rmk: {err:#}");
      return ExitCode::from(2);
    }
  };

  if options.targets.is_empty() {
    print_targets(&project);
    return ExitCode::SUCCESS;
  }

  let opts = RunOptions {
    jobs: options.jobs,
    targets: options.targets,
    shell: options.shell,
  };
  match project.run(&opts) {
    Ok(_) => ExitCode::SUCCESS,
    Err(err) => {
      if matches!(err, BuildError::UnknownTarget(_)) {
        print_targets(&project);
      }
      eprintln!("rmk: {err}");
      ExitCode::from(exit_code(&err))
    }
  }
}
