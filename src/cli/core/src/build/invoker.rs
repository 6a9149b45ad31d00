/* src/cli/core/src/build/invoker.rs */

// Runs the bundler in single-entry mode for one entry key and returns the
// finalized artifact. Builds for different entries run concurrently up to
// `build.max_concurrent`; builds for the same entry queue behind each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axhub_engine::{
  BundlerConfig, BundlerOptions, CONFIG_ENV, ComponentContract, ContractViolation, ENTRY_ENV, EngineError,
  EntryKey, EntryManifest,
};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::{AxhubConfig, BuildMode};

/// Exposes the build mode to the bundler process alongside the entry key.
pub const MODE_ENV: &str = "AXHUB_BUILD_MODE";

const BUNDLER_CONFIG_DIR: &str = ".axhub/bundler";

#[derive(Debug, Error)]
pub enum BuildError {
  /// Unknown entry, malformed key or invalid bundler option.
  #[error(transparent)]
  Config(EngineError),

  #[error(transparent)]
  Contract(#[from] ContractViolation),

  #[error("bundler failed for {entry} ({status})\n{diagnostics}")]
  Failed { entry: String, status: String, diagnostics: String },

  #[error("build of {entry} timed out after {}s", limit.as_secs())]
  TimedOut { entry: String, limit: Duration },

  #[error("build of {entry} was cancelled")]
  Cancelled { entry: String },

  #[error("bundler exited successfully but did not write {}", path.display())]
  MissingArtifact { entry: String, path: PathBuf },

  #[error("failed to {action} {}: {source}", path.display())]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl From<EngineError> for BuildError {
  fn from(err: EngineError) -> Self {
    match err {
      EngineError::Contract(v) => Self::Contract(v),
      other => Self::Config(other),
    }
  }
}

impl BuildError {
  pub fn is_unknown_entry(&self) -> bool {
    matches!(self, Self::Config(EngineError::UnknownEntry { .. }))
  }

  /// Text shown to whoever triggered the build: raw bundler output for
  /// failures, the error message otherwise.
  pub fn diagnostics(&self) -> String {
    match self {
      Self::Failed { diagnostics, .. } => diagnostics.clone(),
      other => other.to_string(),
    }
  }

  fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
    Self::Io { action, path: path.to_path_buf(), source }
  }
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
  pub entry: EntryKey,
  pub path: PathBuf,
  pub code: String,
  pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct InvokerSettings {
  pub command: String,
  pub timeout: Duration,
  pub max_concurrent: usize,
  pub production: BundlerOptions,
  pub preview: BundlerOptions,
  pub contract: ComponentContract,
}

impl InvokerSettings {
  pub fn from_config(config: &AxhubConfig) -> Self {
    Self {
      command: config.build.bundler_command.clone(),
      timeout: Duration::from_secs(config.build.timeout_secs),
      max_concurrent: config.build.max_concurrent,
      production: config.bundler_options(BuildMode::Production),
      preview: config.bundler_options(BuildMode::DevPreview),
      contract: config.contract(),
    }
  }

  fn options(&self, mode: BuildMode) -> &BundlerOptions {
    match mode {
      BuildMode::Production => &self.production,
      BuildMode::DevPreview => &self.preview,
    }
  }
}

/// Kills the bundler's whole process group on drop. `sh -c` runs the real
/// bundler as a grandchild, which `kill_on_drop` alone would leave running.
struct ProcessGroup(Option<u32>);

impl ProcessGroup {
  fn disarm(&mut self) {
    self.0 = None;
  }
}

impl Drop for ProcessGroup {
  fn drop(&mut self) {
    let Some(pgid) = self.0 else { return };
    let status = std::process::Command::new("sh")
      .args(["-c", &format!("kill -KILL -- -{pgid}")])
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status();
    if let Err(e) = status {
      tracing::warn!(pgid, error = %e, "failed to kill bundler process group");
    }
  }
}

pub struct BuildInvoker {
  base_dir: PathBuf,
  settings: InvokerSettings,
  locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
  permits: Semaphore,
  shutdown: CancellationToken,
}

impl BuildInvoker {
  pub fn new(base_dir: impl Into<PathBuf>, settings: InvokerSettings, shutdown: CancellationToken) -> Self {
    let permits = Semaphore::new(settings.max_concurrent.max(1));
    Self { base_dir: base_dir.into(), settings, locks: Mutex::new(HashMap::new()), permits, shutdown }
  }

  fn entry_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    locks.entry(key.to_string()).or_default().clone()
  }

  /// Build `key` from `manifest` and return the finalized artifact.
  pub async fn build(
    &self,
    manifest: &EntryManifest,
    key: &str,
    mode: BuildMode,
  ) -> Result<BuildOutput, BuildError> {
    let started = Instant::now();
    let source_rel = manifest.source_path(key)?;
    let entry = EntryKey::parse(key)?;

    let source_path = self.base_dir.join(source_rel);
    let source = tokio::fs::read_to_string(&source_path)
      .await
      .map_err(|e| BuildError::io("read entry", &source_path, e))?;
    self.settings.contract.check(&source, source_rel)?;

    let options = self.settings.options(mode);
    let bundler_config = BundlerConfig::resolve(manifest, Some(key), options)?;
    let artifact = self.base_dir.join(&options.out_dir).join(entry.artifact_file_name());

    let lock = self.entry_lock(key);
    let _entry_guard = lock.lock().await;
    let _permit = tokio::select! {
      permit = self.permits.acquire() => permit.map_err(|_| BuildError::Cancelled { entry: key.to_string() })?,
      () = self.shutdown.cancelled() => return Err(BuildError::Cancelled { entry: key.to_string() }),
    };
    let config_path = self.write_bundler_config(&entry, mode, &bundler_config).await?;

    match tokio::fs::remove_file(&artifact).await {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(BuildError::io("remove stale artifact", &artifact, e)),
    }

    tracing::debug!(entry = %key, mode = mode.as_str(), "spawning bundler");
    self.run_bundler(key, mode, &config_path).await?;

    let raw = match tokio::fs::read_to_string(&artifact).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(BuildError::MissingArtifact { entry: key.to_string(), path: artifact });
      }
      Err(e) => return Err(BuildError::io("read artifact", &artifact, e)),
    };
    let code = self.settings.contract.finalize(&raw, &entry);
    if code != raw {
      tokio::fs::write(&artifact, &code).await.map_err(|e| BuildError::io("write artifact", &artifact, e))?;
    }

    let elapsed = started.elapsed();
    tracing::info!(entry = %key, mode = mode.as_str(), bytes = code.len(), ms = elapsed.as_millis() as u64, "built");
    Ok(BuildOutput { entry, path: artifact, code, elapsed })
  }

  async fn write_bundler_config(
    &self,
    entry: &EntryKey,
    mode: BuildMode,
    config: &BundlerConfig,
  ) -> Result<PathBuf, BuildError> {
    let path = self
      .base_dir
      .join(BUNDLER_CONFIG_DIR)
      .join(mode.as_str())
      .join(entry.group().as_str())
      .join(format!("{}.json", entry.name()));
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await.map_err(|e| BuildError::io("create", parent, e))?;
    }
    let json = config.to_json()?;
    tokio::fs::write(&path, json).await.map_err(|e| BuildError::io("write bundler config", &path, e))?;
    Ok(path)
  }

  /// Spawn the bundler in its own process group and wait for it. Timeouts,
  /// shutdown and a dropped request all end with the group killed.
  async fn run_bundler(&self, key: &str, mode: BuildMode, config_path: &Path) -> Result<(), BuildError> {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", &self.settings.command]);
    cmd.current_dir(&self.base_dir);
    cmd.env(ENTRY_ENV, key);
    cmd.env(CONFIG_ENV, config_path);
    cmd.env(MODE_ENV, mode.as_str());
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn().map_err(|e| BuildError::io("spawn bundler in", &self.base_dir, e))?;
    let mut group = ProcessGroup(child.id());
    let limit = self.settings.timeout;

    let output = tokio::select! {
      res = tokio::time::timeout(limit, child.wait_with_output()) => match res {
        Ok(output) => output.map_err(|e| BuildError::io("wait for bundler in", &self.base_dir, e))?,
        Err(_) => {
          tracing::warn!(entry = %key, secs = limit.as_secs(), "bundler timed out");
          return Err(BuildError::TimedOut { entry: key.to_string(), limit });
        }
      },
      () = self.shutdown.cancelled() => return Err(BuildError::Cancelled { entry: key.to_string() }),
    };
    group.disarm();

    if output.status.success() {
      return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut diagnostics = stderr.trim_end().to_string();
    if !stdout.trim().is_empty() {
      if !diagnostics.is_empty() {
        diagnostics.push('\n');
      }
      diagnostics.push_str(stdout.trim_end());
    }
    tracing::warn!(entry = %key, status = %output.status, "bundler failed");
    Err(BuildError::Failed { entry: key.to_string(), status: output.status.to_string(), diagnostics })
  }
}
