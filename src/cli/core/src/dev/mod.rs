/* src/cli/core/src/dev/mod.rs */

mod api;
mod error;
mod handlers;
mod network;
mod process;
mod proxy;
mod server;
mod watch;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axhub_engine::{BundlerConfig, CONFIG_ENV, EntryManifest};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::build::scan_and_save;
use crate::config::{AxhubConfig, BuildMode, DEV_BUNDLER_CONFIG};
use crate::shell::expand_port;
use crate::ui::{self, DIM, GREEN, RED, RESET};

use network::{ensure_port_free, wait_for_port};
use process::{ChildProcess, exited};
use proxy::ViteProxy;
use server::{DevContext, build_router};

/// Multi-page bundler config consumed by the Vite dev server child.
fn write_dev_bundler_config(config: &AxhubConfig, base_dir: &Path, manifest: &EntryManifest) -> Result<()> {
  let bundler = BundlerConfig::resolve(manifest, None, &config.bundler_options(BuildMode::DevPreview))?;
  let path = base_dir.join(DEV_BUNDLER_CONFIG);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  std::fs::write(&path, bundler.to_json()?).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(())
}

async fn spawn_vite(config: &AxhubConfig, base_dir: &Path) -> Result<ChildProcess> {
  let vite_port = config.dev.vite_port;
  ensure_port_free(vite_port, "vite").await?;

  let command = expand_port(&config.dev.vite_command, vite_port);
  crate::shell::warn_if_vite_missing(base_dir, &command);
  let config_path = base_dir.join(DEV_BUNDLER_CONFIG);
  let config_str = config_path.to_string_lossy().to_string();
  let mut proc = ChildProcess::spawn("vite", &command, base_dir, &[(CONFIG_ENV, config_str.as_str())])?;
  proc.pipe_output();

  println!("  {DIM}waiting for vite on :{vite_port}...{RESET}");
  wait_for_port(vite_port, Duration::from_secs(30)).await?;
  println!("  {GREEN}vite ready{RESET}");
  Ok(proc)
}

fn print_dev_banner(config: &AxhubConfig, port: u16, manifest_len: usize, vite: bool) {
  ui::banner("dev");
  ui::arrow(&format!("http://{}:{port}/", config.dev.host));
  ui::detail(&format!("{} under {}/", ui::entries(manifest_len), config.source.root));
  if vite {
    ui::detail(&format!("vite on :{} (proxied)", config.dev.vite_port));
  } else {
    ui::detail("vite disabled; module requests answer 404");
  }
  ui::blank();
}

pub async fn run_dev(config: &AxhubConfig, base_dir: &Path, port: Option<u16>, no_vite: bool) -> Result<()> {
  let manifest = scan_and_save(config, base_dir)?;
  write_dev_bundler_config(config, base_dir, &manifest)?;

  let port = port.unwrap_or(config.dev.port);
  print_dev_banner(config, port, manifest.len(), !no_vite);

  let shutdown = CancellationToken::new();
  let mut vite = if no_vite { None } else { Some(spawn_vite(config, base_dir).await?) };
  let proxy = vite.as_ref().map(|_| ViteProxy::new(config.dev.vite_port));

  let ctx = Arc::new(DevContext::new(config.clone(), base_dir.to_path_buf(), manifest, proxy, shutdown.clone()));
  let (_watcher, mut watcher_rx) = watch::watch_source_root(&ctx.source_root())?;

  let listener = tokio::net::TcpListener::bind((config.dev.host.as_str(), port))
    .await
    .with_context(|| format!("failed to bind {}:{port}", config.dev.host))?;
  let app = build_router(ctx.clone());
  let server_token = shutdown.clone();
  let server = tokio::spawn(async move {
    axum::serve(listener, app).with_graceful_shutdown(async move { server_token.cancelled().await }).await
  });

  let mut debounce = watch::Debounce::default();
  loop {
    tokio::select! {
      _ = signal::ctrl_c() => {
        println!();
        println!("  {DIM}shutting down...{RESET}");
        break;
      }
      (label, status) = exited(&mut vite) => {
        match status {
          Ok(s) if s.success() => println!("  {DIM}{label} exited{RESET}"),
          Ok(s) => println!("  {RED}{label} exited with {s}{RESET}"),
          Err(e) => println!("  {RED}{label} error: {e}{RESET}"),
        }
        break;
      }
      Some(()) = watcher_rx.recv() => debounce.bump(),
      () = debounce.elapsed() => {
        let scanning = ctx.clone();
        match tokio::task::spawn_blocking(move || scanning.rescan()).await {
          Ok(Ok(fresh)) => {
            ui::dev_event(&format!("rescanned, {}", ui::entries(fresh.len())));
            if let Err(e) = write_dev_bundler_config(config, base_dir, &fresh) {
              ui::dev_error(&format!("{e:#}"));
            }
          }
          Ok(Err(e)) => ui::dev_error(&format!("rescan failed: {e:#}")),
          Err(e) => ui::dev_error(&format!("rescan panicked: {e}")),
        }
      }
    }
  }

  shutdown.cancel();
  server.await.context("dev server task failed")?.context("dev server error")?;
  Ok(())
}
