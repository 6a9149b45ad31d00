/* src/cli/core/src/dev/watch.rs */

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::Receiver;
use tokio::time::Instant;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Only structural changes can add or drop entries; content edits are
/// Vite's business.
fn changes_layout(kind: &EventKind) -> bool {
  matches!(kind, EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)))
}

/// Watch the source root recursively. The receiver yields one `()` per
/// relevant event; callers debounce.
pub(super) fn watch_source_root(root: &Path) -> Result<(RecommendedWatcher, Receiver<()>)> {
  let (tx, rx) = tokio::sync::mpsc::channel(16);
  let mut watcher = RecommendedWatcher::new(
    move |res: std::result::Result<notify::Event, notify::Error>| {
      if let Ok(event) = res
        && changes_layout(&event.kind)
      {
        let _ = tx.try_send(());
      }
    },
    notify::Config::default(),
  )?;
  watcher.watch(root, RecursiveMode::Recursive).with_context(|| format!("failed to watch {}", root.display()))?;
  Ok((watcher, rx))
}

/// Trailing-edge debounce for watcher events. Every event pushes the deadline
/// out; `elapsed` resolves once it passes and stays pending while idle, so it
/// can sit in a `select!` next to shutdown branches.
#[derive(Debug, Default)]
pub(super) struct Debounce {
  deadline: Option<Instant>,
}

impl Debounce {
  pub(super) fn bump(&mut self) {
    self.deadline = Some(Instant::now() + DEBOUNCE);
  }

  pub(super) async fn elapsed(&mut self) {
    match self.deadline {
      Some(at) => {
        tokio::time::sleep_until(at).await;
        self.deadline = None;
      }
      None => std::future::pending().await,
    }
  }
}
