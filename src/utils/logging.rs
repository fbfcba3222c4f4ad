//! Diagnostics logging setup.
//!
//! The terminal UI owns stdout and stderr while it runs, so interactive
//! sessions log to a file. One-shot commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "PERSONA_CHAT_LOG";

pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

fn env_filter(default: &str) -> EnvFilter {
    let directives = std::env::var(LOG_ENV_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default.to_string());
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global tracing subscriber. Calling it twice is harmless.
pub fn init_tracing(target: LogTarget<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let builder = tracing_subscriber::fmt().with_target(true).with_level(true);

    match target {
        LogTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder
                .with_env_filter(env_filter("info"))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Stderr => {
            // Shares the terminal with command output.
            let _ = builder
                .with_env_filter(env_filter("warn"))
                .with_writer(std::io::stderr)
                .compact()
                .try_init();
        }
    }
    Ok(())
}
