/* src/cli/core/src/ui.rs */

use std::time::Duration;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn banner(cmd: &str) {
  println!();
  println!("  {BOLD}Axhub Make{RESET} {cmd} {DIM}v{VERSION}{RESET}");
  println!();
}

pub fn ok(msg: &str) {
  println!("  {GREEN}\u{2713}{RESET} {msg}");
}

pub fn warn(msg: &str) {
  println!("  {YELLOW}!{RESET} {msg}");
}

pub fn arrow(msg: &str) {
  println!("  {GREEN}\u{2192}{RESET} {msg}");
}

pub fn step(n: usize, total: usize, msg: &str) {
  println!("  {BOLD}[{n}/{total}]{RESET} {msg}...");
}

pub fn detail(msg: &str) {
  println!("        {msg}");
}

pub fn blank() {
  println!();
}

/// `1 entry`, `3 entries`.
pub fn entries(n: usize) -> String {
  if n == 1 { "1 entry".to_string() } else { format!("{n} entries") }
}

/// One line of `axhub build` progress for a finished artifact.
pub fn entry_built(key: &str, bytes: usize, elapsed: Duration) {
  println!("        {GREEN}\u{2713}{RESET} {key} {DIM}{}, {}ms{RESET}", format_size(bytes), elapsed.as_millis());
}

pub fn entry_failed(key: &str) {
  eprintln!("        {RED}\u{2717}{RESET} {key}");
}

/// Dev loop notices (rescans, config rewrites), tagged so they stand out
/// from relayed Vite output.
pub fn dev_event(msg: &str) {
  println!("  {CYAN}[axhub]{RESET} {msg}");
}

pub fn dev_error(msg: &str) {
  println!("  {RED}[axhub]{RESET} {msg}");
}

/// A relayed line of child output, prefixed with the child's label.
pub fn child_line(label: &str, line: &str) -> String {
  format!("  {MAGENTA}{DIM}{label:>8}{RESET} {line}")
}

fn format_size(bytes: usize) -> String {
  if bytes >= 1_000_000 {
    format!("{:.1} MB", bytes as f64 / 1_000_000.0)
  } else if bytes >= 1_000 {
    format!("{:.1} kB", bytes as f64 / 1_000.0)
  } else {
    format!("{bytes} B")
  }
}
