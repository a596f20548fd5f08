//! CLI subcommand implementations.

pub mod activity;
pub mod booking;
pub mod export;
pub mod import;
pub mod report;
pub mod user;
pub mod util;
