//! # IRG
//!
//! Identity relationship graph builder for cloud audit-trail log directories.
//!
//! ## Architecture
//!
//! The run follows a Source-Builder-Report flow:
//!
//! 1. **Source**: Walks a directory tree and streams the `Records` array of
//!    every `.json` bundle
//! 2. **Builder**: Folds each record into the graph and stats (`irg-graph`)
//! 3. **Orchestrator**: Drives the source through the builder and counts
//!    record dispositions
//! 4. **Report**: Prints counts, stats and an optional graph listing
//!
//! ## Modules
//!
//! - [`config`]: CLI arguments, environment and constants
//! - [`source`]: Record sources (directory walker, in-memory mock)
//! - [`orchestrator`]: Coordinates a run
//! - [`report`]: Run report and graph listing
//! - [`errors`]: Error types for the source layer

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod report;
pub mod source;

pub use config::{Cli, Config, LogFormat};
pub use errors::SourceError;
pub use orchestrator::{run_directory, Orchestrator, RunOutput, RunReport};

use thiserror::Error;

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum IrgError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Source error.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),
}

impl IrgError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
