use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend model identifier (e.g., "gemini-2.5-flash")
    pub model: Option<String>,
    /// Base URL of the generative language API
    pub base_url: Option<String>,
    /// Directory holding personas.json and chat_sessions.json
    pub data_dir: Option<PathBuf>,
    /// UI theme ("dark" or "light")
    pub theme: Option<ThemeChoice>,
    /// Render model replies as markdown
    pub markdown: Option<bool>,
    /// Diagnostics log file for interactive sessions
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Effective API base URL. `GEMINI_BASE_URL` wins over the config file.
    pub fn base_url(&self) -> String {
        std::env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    pub fn theme(&self) -> ThemeChoice {
        self.theme.unwrap_or_default()
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    /// Log destination for the TUI: explicit setting, else a file in the data dir.
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("persona-chat.log"))
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  model: {}", self.model());
        println!("  base-url: {}", self.base_url());
        println!("  data-dir: {}", path_display(self.data_dir()));
        match self.theme() {
            ThemeChoice::Dark => println!("  theme: dark"),
            ThemeChoice::Light => println!("  theme: light"),
        }
        match self.markdown_enabled() {
            true => println!("  markdown: on"),
            false => println!("  markdown: off"),
        }
        println!("  log-file: {}", path_display(self.log_file()));
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
