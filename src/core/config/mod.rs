//! User configuration stored as TOML in the platform config directory.

pub mod data;
mod io;

pub use data::{path_display, Config, ThemeChoice, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use io::ConfigError;
