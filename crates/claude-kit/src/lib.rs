pub mod agent;
pub mod client;
pub mod configuration;
pub mod conversation;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod retry;
pub mod structured;
pub mod toolbox;

pub use agent::Agent;
pub use client::ClaudeClient;
pub use conversation::Conversation;
pub use errors::{Error, Result};
