//! Shell command execution.
//!
//! Every target command runs through a shell so that templates may use
//! redirection, pipes and globbing. Stdout and stderr are inherited from the
//! calling process.

use std::io;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::debug;

#[cfg(unix)]
const DEFAULT_SHELL: &str = "/bin/sh";
#[cfg(windows)]
const DEFAULT_SHELL: &str = "powershell.exe";

#[cfg(unix)]
const SHELL_ARG: &str = "-c";
#[cfg(windows)]
const SHELL_ARG: &str = "-Command";

/// Run `cmd` through the platform shell, or `shell` when given, and wait for
/// it to finish.
pub async fn run(cmd: &str, shell: Option<&str>) -> io::Result<ExitStatus> {
  let program = shell.unwrap_or(DEFAULT_SHELL);
  debug!(%program, %cmd, "spawning");
  Command::new(program).arg(SHELL_ARG).arg(cmd).status().await
}
