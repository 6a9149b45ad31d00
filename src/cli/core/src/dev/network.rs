/* src/cli/core/src/dev/network.rs */

use std::time::{Duration, Instant};

use anyhow::{Result, bail};

/// Poll a TCP port until it accepts connections, or bail after timeout.
/// Tries both IPv6 (::1) and IPv4 (127.0.0.1) since Vite may bind IPv6-only.
pub(super) async fn wait_for_port(port: u16, timeout: Duration) -> Result<()> {
  let deadline = Instant::now() + timeout;
  loop {
    if port_accepts(port).await {
      return Ok(());
    }
    if Instant::now() >= deadline {
      bail!("timed out waiting for port {port} to become ready");
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
  }
}

/// Fail fast when something already listens where the Vite child should start.
pub(super) async fn ensure_port_free(port: u16, what: &str) -> Result<()> {
  if port_accepts(port).await {
    bail!("port {port} for {what} is already in use");
  }
  Ok(())
}

async fn port_accepts(port: u16) -> bool {
  tokio::net::TcpStream::connect(("::1", port)).await.is_ok()
    || tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok()
}
