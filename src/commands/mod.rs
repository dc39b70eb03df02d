/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`: interactive chat session
- `analyze`: one-shot image analysis

Both are thin: they call session entry points and render the message log.
*/

use crate::attachments::Attachment;
use crate::config::Config;
use crate::error::{Result, ScholiaError};
use crate::prompts::Module;
use crate::session::{Message, Role, Session, SubmitOutcome};
use colored::Colorize;
use std::path::PathBuf;

// Special commands parser for the chat REPL
pub mod special_commands;

/// Format a message for the terminal
///
/// Every role has its own rendering; adding a role forces a decision here.
pub fn format_message(message: &Message) -> String {
    let body = match message.role() {
        Role::User => format!("{} {}", "You:".bold().green(), message.text()),
        Role::Assistant => format!("{}\n{}", "Scholia:".bold().cyan(), message.text()),
        Role::SystemError => format!("{}", message.text().red()),
    };

    if message.attachments().is_empty() {
        body
    } else {
        let names: Vec<&str> = message.attachments().iter().map(Attachment::name).collect();
        format!("{}\n{}", body, format!("[images: {}]", names.join(", ")).dimmed())
    }
}

/// Format a message with its local time, for the history view
pub fn format_history_entry(message: &Message) -> String {
    let time = message
        .created_at()
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S")
        .to_string();
    format!("{} {}", time.dimmed(), format_message(message))
}

/// Format a pending attachment as one listing line
pub fn format_attachment(attachment: &Attachment) -> String {
    format!(
        "{}  {} ({}, {} bytes)",
        attachment.id().to_string().yellow(),
        attachment.name(),
        attachment.mime_type(),
        attachment.size()
    )
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates a chat session and runs a readline-based loop. Plain input is
    //! submitted together with any pending attachments; `/`-prefixed input is
    //! handled as a special command.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let session = Session::from_config(Module::Chat, &config);
        tracing::debug!("Session ready ({} module)", session.module());

        // Create readline instance
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);
        for message in session.messages() {
            println!("{}\n", format_message(&message));
        }

        loop {
            let prompt = format_prompt(session.pending_attachments().len());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() && session.pending_attachments().is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Attach(path)) => {
                            attach(&session, path).await;
                            continue;
                        }
                        Ok(SpecialCommand::Detach(id)) => {
                            if session.remove_attachment(id) {
                                println!("Removed attachment {}\n", id);
                            } else {
                                println!("No pending attachment with id {}\n", id);
                            }
                            continue;
                        }
                        Ok(SpecialCommand::ListAttachments) => {
                            print_attachments(&session.pending_attachments());
                            continue;
                        }
                        Ok(SpecialCommand::ClearAttachments) => {
                            session.clear_attachments();
                            println!("Cleared pending attachments\n");
                            continue;
                        }
                        Ok(SpecialCommand::History) => {
                            for message in session.messages() {
                                println!("{}\n", format_history_entry(&message));
                            }
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {
                            // Regular message for the assistant
                        }
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    }

                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed)?;
                    }

                    session.set_draft(trimmed);
                    println!("{}", "Thinking... 🤔".dimmed());
                    let outcome = session.submit_draft().await;

                    if let SubmitOutcome::Answered(_) | SubmitOutcome::Failed(_) = outcome {
                        if let Some(message) = session.last_message() {
                            println!("\n{}\n", format_message(&message));
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn attach(session: &Session, path: PathBuf) {
        match session.add_attachment_path(&path).await {
            Ok(attachment) => println!(
                "{} {}\n",
                "Attached".green(),
                format_attachment(&attachment)
            ),
            Err(ScholiaError::InvalidAttachmentKind(detail)) => {
                eprintln!("{}\n", format!("Only images can be attached: {}", detail).red());
            }
            Err(e) => {
                eprintln!(
                    "{}\n",
                    format!("Could not attach {}: {}", path.display(), e).red()
                );
            }
        }
    }

    fn print_attachments(attachments: &[Attachment]) {
        if attachments.is_empty() {
            println!("No pending attachments\n");
            return;
        }
        for attachment in attachments {
            println!("{}", format_attachment(attachment));
        }
        println!();
    }

    /// Prompt string, showing how many images will go with the next message
    fn format_prompt(pending: usize) -> String {
        match pending {
            0 => format!("{} ", ">>".bold().green()),
            n => format!("{} {} ", format!("[{} image(s)]", n).yellow(), ">>".bold().green()),
        }
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║          Scholia - Social Science Research Assistant         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model: {}\n", config.provider.gemini.model.cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

}

// Image analysis command handler
pub mod analyze {
    //! One-shot image analysis.
    //!
    //! Adds every given file to an image-analysis session, submits once, and
    //! prints the result. Non-image files are reported and skipped.

    use super::*;

    /// Analyze images and print the result
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `images` - Files to analyze, in output order
    /// * `prompt` - Optional focus for the analysis
    /// * `json` - Print the transcript as JSON instead of plain text
    ///
    /// # Errors
    ///
    /// Returns an error when no valid image was given or the analysis failed;
    /// the failure notice has already been printed at that point.
    pub async fn run_analyze(
        config: Config,
        images: Vec<PathBuf>,
        prompt: Option<String>,
        json: bool,
    ) -> Result<()> {
        tracing::info!("Starting image analysis of {} file(s)", images.len());

        let session = Session::from_config(Module::ImageAnalysis, &config);
        tracing::debug!("Session ready ({} module)", session.module());

        for path in &images {
            if let Err(e) = session.add_attachment_path(path).await {
                eprintln!("{}", format!("Skipping {}: {}", path.display(), e).red());
            }
        }

        if session.pending_attachments().is_empty() {
            return Err(ScholiaError::InvalidAttachmentKind(
                "no valid image was given".to_string(),
            )
            .into());
        }

        session.set_draft(prompt.unwrap_or_default());
        let outcome = session.submit_draft().await;

        if json {
            println!("{}", serde_json::to_string_pretty(&session.messages())?);
        } else if let Some(message) = session.last_message() {
            match message.role() {
                Role::SystemError => eprintln!("{}", format_message(&message)),
                Role::User | Role::Assistant => println!("{}", message.text()),
            }
        }

        match outcome {
            SubmitOutcome::Answered(_) => Ok(()),
            SubmitOutcome::Failed(_) | SubmitOutcome::Ignored(_) => {
                Err(ScholiaError::Generation("image analysis failed".to_string()).into())
            }
        }
    }

}
