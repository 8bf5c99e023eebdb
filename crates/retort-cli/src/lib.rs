//! Retort CLI library.
//!
//! Local front end for the ingestion pipeline: parse a PDF into a review
//! file, edit it, commit it, and browse what was saved.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use output::Formatter;
