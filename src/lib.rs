//! persona-chat is a terminal client for chatting with AI personas backed by
//! a streaming generative-language API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns personas, transcripts, persistence and the reply
//!   streaming pipeline, plus the application state machine in
//!   [`core::app`].
//! - [`ui`] renders the dashboard, creation form and chat screens and runs
//!   the interactive event loop.
//! - [`api`] defines the request and response payloads exchanged with the
//!   backend.
//! - [`cli`] parses arguments and dispatches into the interactive loop or
//!   the one-shot commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
