//! Command-line interface definition for Scholia
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat command and one-shot image analysis.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scholia - social science research assistant
///
/// Ask social science questions in plain language, or have images read
/// from a social science perspective.
#[derive(Parser, Debug, Clone)]
#[command(name = "scholia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Scholia
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Analyze one or more images and print the result
    Analyze {
        /// Image files to analyze
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// What the analysis should focus on
        #[arg(short, long)]
        prompt: Option<String>,

        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },
}

impl Commands {
    /// Model override given on the command line, if any
    pub fn model_override(&self) -> Option<&str> {
        match self {
            Self::Chat { model } | Self::Analyze { model, .. } => model.as_deref(),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat { model: None },
        }
    }
}
