//! carclass CLI library.
//!
//! This crate provides the command-line interface for the carclass backend:
//!
//! - **Serve**: run the HTTP server (upload, history, and stats endpoints)
//! - **Stats**: print aggregate statistics for an existing database
//!
//! # Example
//!
//! ```bash
//! # Serve on the default port with a model artifact
//! carclass serve --model-dir ./model --db-path ./carclass.db
//!
//! # Inspect the history of a database
//! carclass stats --db-path ./carclass.db
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{ServeCommand, StatsCommand};

/// carclass - car image classification backend
#[derive(Parser, Debug)]
#[command(name = "carclass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the classification backend over HTTP
    Serve(ServeCommand),

    /// Print aggregate statistics for an existing database
    Stats(StatsCommand),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = anyhow::Result<T>;
