//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, wires the configured backend
//! and state files together, and dispatches to the requested command.

pub mod persona_list;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::cli::persona_list::list_personas;
use crate::cli::say::run_say;
use crate::core::app::{App, UiState};
use crate::core::chat_stream::ChatStreamService;
use crate::core::config::Config;
use crate::core::gemini::{api_key_from_env, GeminiBackend, API_KEY_ENV_VARS};
use crate::core::storage::JsonFileStore;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_tracing, LogTarget};

#[derive(Parser)]
#[command(name = "persona-chat", version)]
#[command(about = "Chat with AI personas in your terminal")]
#[command(
    long_about = "persona-chat is a full-screen terminal client for talking to AI personas. \
Each persona has its own system instruction and its own saved conversation; replies \
stream in as they are generated.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    API key for the generative language API (API_KEY is also accepted)\n\
  GEMINI_BASE_URL   Custom API base URL (optional)\n\
  PERSONA_CHAT_LOG  Log filter directives, e.g. debug or persona_chat=trace\n\n\
Controls:\n\
  Enter             Send the message / open the selected card\n\
  Alt+Enter         Insert a newline in the message\n\
  Alt+Up/Alt+Down   Switch to the previous/next persona\n\
  Ctrl+N            Create a new persona\n\
  Ctrl+L            Clear the current conversation\n\
  PageUp/PageDown   Scroll the conversation\n\
  Esc               Back to the dashboard\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use instead of the configured one
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory holding personas.json and chat_sessions.json
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write logs of the interactive session to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List personas grouped by category
    List,
    /// Print the effective configuration
    Config,
    /// Send one message to a persona and stream the reply to stdout
    Say {
        /// Persona id or name
        #[arg(short = 'p', long)]
        persona: String,
        /// Message text
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn build_backend(config: &Config) -> Result<GeminiBackend, Box<dyn Error>> {
    let Some(api_key) = api_key_from_env() else {
        return Err(format!(
            "no API key found; set {} (or {})",
            API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
        )
        .into());
    };
    Ok(GeminiBackend::new(
        reqwest::Client::new(),
        config.base_url(),
        config.model(),
        api_key,
    ))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(model) = args.model.clone() {
        config.model = Some(model);
    }

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let log_file = args.log.unwrap_or_else(|| config.log_file());
            init_tracing(LogTarget::File(&log_file))?;

            let backend = build_backend(&config)?;
            info!(model = backend.model(), "starting interactive session");
            let store = JsonFileStore::new(config.data_dir());
            let app = App::load_with_ui(Box::new(store), UiState::from_config(&config))?;
            let (stream_service, rx) = ChatStreamService::new(Arc::new(backend));
            run_chat(app, stream_service, rx).await
        }
        Commands::List => {
            init_tracing(LogTarget::Stderr)?;
            list_personas(&config)
        }
        Commands::Config => {
            config.print_all();
            Ok(())
        }
        Commands::Say { persona, prompt } => {
            init_tracing(LogTarget::Stderr)?;
            let backend = build_backend(&config)?;
            run_say(&config, Arc::new(backend), &persona, &prompt.join(" ")).await
        }
    }
}

#[cfg(test)]
mod tests;
