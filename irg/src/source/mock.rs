//! In-memory record source.
//!
//! # Example
//!
//! ```
//! use irg::source::{MockSource, RecordSource};
//! use serde_json::json;
//!
//! let mut source = MockSource::new()
//!     .with_bundle(vec![json!({ "eventName": "GetObject" })])
//!     .with_bundle(vec![json!({ "eventName": "PutObject" })]);
//!
//! let mut names = Vec::new();
//! let summary = source.drain(|record| names.push(record["eventName"].clone())).unwrap();
//! assert_eq!(summary.files_scanned, 2);
//! assert_eq!(names.len(), 2);
//! ```

use serde_json::Value;

use super::{RecordSource, SourceSummary};
use crate::errors::SourceError;

/// Bundles of raw records held in memory, delivered in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    bundles: Vec<Vec<Value>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bundle
    pub fn with_bundle(mut self, records: Vec<Value>) -> Self {
        self.bundles.push(records);
        self
    }
}

impl RecordSource for MockSource {
    fn drain<F>(&mut self, mut visit: F) -> Result<SourceSummary, SourceError>
    where
        F: FnMut(Value),
    {
        let mut summary = SourceSummary::default();
        for bundle in &self.bundles {
            summary.files_scanned += 1;
            for record in bundle {
                visit(record.clone());
                summary.records += 1;
            }
        }
        Ok(summary)
    }
}
