//! Record sources
//!
//! A source hands raw record values to a visitor, one at a time, in a stable
//! order. Per-file failures are logged and counted by the source itself; only
//! failures that make the whole source unusable are returned as errors.
//!
//! - [`DirectorySource`]: walks a directory tree of `.json` bundles
//! - [`MockSource`]: in-memory bundles for tests and embedding

mod directory;
mod mock;
pub mod stream;

pub use directory::DirectorySource;
pub use mock::MockSource;

use serde_json::Value;

use crate::errors::SourceError;

/// Counters describing one pass over a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSummary {
    /// Bundles opened
    pub files_scanned: usize,
    /// Bundles that failed to open or parse (records read before a parse
    /// failure are still delivered)
    pub files_failed: usize,
    /// Records delivered to the visitor
    pub records: usize,
}

/// A sequence of raw audit records.
pub trait RecordSource {
    /// Deliver every record to `visit`, in source order.
    fn drain<F>(&mut self, visit: F) -> Result<SourceSummary, SourceError>
    where
        F: FnMut(Value);
}
