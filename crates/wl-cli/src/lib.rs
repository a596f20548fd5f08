//! Work log CLI library.
//!
//! This crate provides the CLI interface for the work log.

mod cli;
pub mod commands;
mod config;

pub use cli::{ActivityAction, Cli, Commands, UserAction};
pub use config::Config;
