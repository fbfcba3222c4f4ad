pub mod app;
pub mod builtin_personas;
pub mod chat_stream;
pub mod config;
pub mod gemini;
pub mod ids;
pub mod message;
pub mod persona;
pub mod session;
pub mod storage;
pub mod transcript;
