//! Command-line argument parsing for model-runner
//!
//! Provides clap-based CLI with one subcommand per client operation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// model-runner - Manage and chat with models served by the local model runner
#[derive(Parser, Debug)]
#[command(name = "model-runner")]
#[command(version)]
#[command(about = "Manage and chat with models served by the local model runner", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log verbosity: -v (debug), -vv (trace); overrides the configured level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List the available models
    #[command(alias = "ls")]
    List {
        /// List models in a JSON format
        #[arg(long)]
        json: bool,
        /// List models in an OpenAI format
        #[arg(long)]
        openai: bool,
        /// Only show model IDs
        #[arg(short, long)]
        quiet: bool,
    },

    /// Display detailed information on one model
    Inspect {
        model: String,
        /// Show the model in an OpenAI format
        #[arg(long)]
        openai: bool,
    },

    /// Pull a model
    Pull { model: String },

    /// Push a model
    Push { model: String },

    /// Tag a model: SOURCE TARGET[:TAG]
    Tag { source: String, target: String },

    /// Remove one or more models
    Rm {
        #[arg(required = true)]
        models: Vec<String>,
    },

    /// Send a single prompt to a model and stream the reply
    Run { model: String, prompt: String },

    /// Check whether the model runner is running
    Status,
}

impl Args {
    /// Effective log level given the configured one
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    }

    /// Reject flag combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::List {
            openai: true,
            quiet: true,
            ..
        } = self.command
        {
            return Err("--quiet flag cannot be used with --openai flag".to_string());
        }
        Ok(())
    }
}

/// Split `repo[:tag]` into repository and tag, defaulting the tag to "latest"
///
/// A `:` before the last `/` belongs to a registry host, not a tag.
pub fn split_target(target: &str) -> (String, String) {
    let name_start = target.rfind('/').map(|i| i + 1).unwrap_or(0);
    match target[name_start..].rfind(':') {
        Some(i) => {
            let colon = name_start + i;
            (target[..colon].to_string(), target[colon + 1..].to_string())
        }
        None => (target.to_string(), "latest".to_string()),
    }
}
