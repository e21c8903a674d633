//! CLI command handlers, one per file.

mod checksum;
mod presets;
mod save;

pub use checksum::run_checksum;
pub use presets::run_presets;
#[cfg(test)]
pub use presets::PRESET_URLS;
pub use save::{run_save, SaveArgs};
