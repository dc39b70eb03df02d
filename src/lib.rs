//! Scholia - social science research assistant library
//!
//! This library provides the core of the Scholia assistant: a conversation
//! session that forwards questions and images to a generative model and keeps
//! an ordered, append-only message log.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `attachments`: Pending image attachments and their base64 encoding
//! - `providers`: AI provider abstraction and the Gemini implementation
//! - `gateway`: Lazily-initialized access to the configured provider
//! - `prompts`: Module profiles, greetings, failure texts, and prompt templates
//! - `session`: The conversation state machine and its message log
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface definition and handlers
//!
//! # Example
//!
//! ```no_run
//! use scholia::{Config, Module, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let session = Session::from_config(Module::Chat, &config);
//!     session.submit_text("What is social stratification?").await;
//!     if let Some(reply) = session.last_message() {
//!         println!("{}", reply.text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prompts;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use attachments::{Attachment, AttachmentId, AttachmentStore, IncomingFile};
pub use config::Config;
pub use error::{Result, ScholiaError};
pub use gateway::ModelGateway;
pub use prompts::Module;
pub use session::{
    IgnoreReason, Message, MessageId, Role, Session, SessionStatus, SubmitOutcome,
};

#[cfg(test)]
pub mod test_utils;
