//! CLI module for model-runner
//!
//! Handles command-line argument parsing only; all daemon work goes through
//! [`crate::models::ModelClient`].

pub mod args;

pub use args::{split_target, Args, Commands};
