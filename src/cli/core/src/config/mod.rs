/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::resolve_config;
pub use types::{AxhubConfig, BuildMode, DEV_BUNDLER_CONFIG, PreviewMode, STATE_DIR};
