/* src/cli/core/src/dev/process.rs */

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::ui;

/// A long-running dev child (the Vite server) whose output is relayed under
/// its label.
pub(super) struct ChildProcess {
  pub label: &'static str,
  child: Child,
}

impl ChildProcess {
  pub(super) fn spawn(label: &'static str, command: &str, base_dir: &Path, env_vars: &[(&str, &str)]) -> Result<Self> {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd.current_dir(base_dir);
    cmd.envs(env_vars.iter().copied());
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let child = cmd.spawn().with_context(|| format!("failed to start {label}: {command}"))?;
    Ok(Self { label, child })
  }

  pub(super) fn pipe_output(&mut self) {
    if let Some(stdout) = self.child.stdout.take() {
      forward_lines(stdout, self.label, false);
    }
    if let Some(stderr) = self.child.stderr.take() {
      forward_lines(stderr, self.label, true);
    }
  }
}

fn forward_lines<R>(reader: R, label: &'static str, to_stderr: bool)
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
      let line = ui::child_line(label, &line);
      if to_stderr {
        eprintln!("{line}");
      } else {
        println!("{line}");
      }
    }
  });
}

/// Resolves when the child exits; stays pending when there is no child, so
/// it can sit in a `select!` unconditionally.
pub(super) async fn exited(proc: &mut Option<ChildProcess>) -> (&'static str, std::io::Result<ExitStatus>) {
  match proc {
    Some(proc) => (proc.label, proc.child.wait().await),
    None => std::future::pending().await,
  }
}
