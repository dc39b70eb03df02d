//! Special commands parser for interactive chat mode
//!
//! Special commands manage the pending attachments and the session itself
//! rather than being sent to the model. They are prefixed with `/`; the
//! command word is case-insensitive, its argument is kept verbatim.

use crate::attachments::AttachmentId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Add an image from disk to the pending attachments
    Attach(PathBuf),

    /// Remove a pending attachment by id
    Detach(AttachmentId),

    /// List pending attachments
    ListAttachments,

    /// Drop all pending attachments
    ClearAttachments,

    /// Re-render the whole conversation
    History,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message for the model
    None,
}

/// Parse user input into a special command
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and for commands with a
/// missing or malformed argument.
///
/// # Examples
///
/// ```
/// use scholia::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/attach photos/street.png").unwrap();
/// assert_eq!(cmd, SpecialCommand::Attach("photos/street.png".into()));
///
/// let cmd = parse_special_command("What is a norm?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // exit/quit also work without the slash
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, arg)) => (command.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/attach" | "/a" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/attach".to_string(),
                    usage: "/attach <path>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Attach(PathBuf::from(arg)))
            }
        }

        "/detach" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/detach".to_string(),
                    usage: "/detach <id>".to_string(),
                });
            }
            arg.parse::<AttachmentId>()
                .map(SpecialCommand::Detach)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/detach".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/attachments" if arg.is_empty() => Ok(SpecialCommand::ListAttachments),
        "/clear" if arg.is_empty() => Ok(SpecialCommand::ClearAttachments),
        "/history" if arg.is_empty() => Ok(SpecialCommand::History),
        "/help" | "/?" if arg.is_empty() => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" if arg.is_empty() => Ok(SpecialCommand::Exit),

        "/attachments" | "/clear" | "/history" | "/help" | "/?" | "/exit" | "/quit" => {
            Err(CommandError::UnsupportedArgument {
                command,
                arg: arg.to_string(),
            })
        }

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Display help for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

ATTACHMENTS:
  /attach <path>  - Attach an image to your next message
  /a <path>       - Shorthand for /attach
  /detach <id>    - Remove a pending attachment
  /attachments    - List pending attachments
  /clear          - Remove all pending attachments

SESSION:
  /history        - Show the whole conversation
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive; paths are not
  - Regular text (not starting with /) is sent to the assistant
  - Only image files can be attached
  - Attachments are analyzed one by one and cleared after each message
"#
    );
}
