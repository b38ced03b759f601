//! Orchestrator module for a graph-building run.
//!
//! Drives a record source through the graph builder. Every record is
//! decoded and folded in source order; records that cannot be linked are
//! logged with their content and counted, never fatal.

use tracing::{error, info, instrument};

use irg_graph::{GraphBuilder, IdentityGraph, RecordOutcome, Stats};

use crate::config::Config;
use crate::source::{DirectorySource, RecordSource};
use crate::IrgError;

/// Record and file dispositions for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub records_read: usize,
    /// Undecodable or missing a required key
    pub records_rejected: usize,
    /// Failed API calls (stats only)
    pub error_records: usize,
    /// Actors other than IAM users (stats only)
    pub filtered_records: usize,
    /// Records that resolved an identity node
    pub linked_records: usize,
}

/// Finished graph, stats and report
#[derive(Debug)]
pub struct RunOutput {
    pub graph: IdentityGraph,
    pub stats: Stats,
    pub report: RunReport,
}

/// Orchestrator that folds a record source into a graph.
pub struct Orchestrator<S> {
    source: S,
}

impl<S: RecordSource> Orchestrator<S> {
    /// Create a new orchestrator over the given source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Run the source to exhaustion.
    ///
    /// Only a source that cannot start (e.g. a missing directory) fails the
    /// run; per-file and per-record problems are logged and counted.
    #[instrument(skip(self))]
    pub fn run(mut self) -> Result<RunOutput, IrgError> {
        let mut builder = GraphBuilder::new();
        let mut report = RunReport::default();

        let summary = self.source.drain(|value| {
            report.records_read += 1;
            match builder.process_raw(&value) {
                Ok(RecordOutcome::ErrorRecord { .. }) => report.error_records += 1,
                Ok(RecordOutcome::NotIamUser { .. }) => report.filtered_records += 1,
                Ok(RecordOutcome::Linked { .. }) => report.linked_records += 1,
                Err(e) => {
                    report.records_rejected += 1;
                    error!(error = %e, record = %value, "Skipping record");
                }
            }
        })?;

        report.files_scanned = summary.files_scanned;
        report.files_failed = summary.files_failed;

        let (graph, stats) = builder.into_parts();
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            files = report.files_scanned,
            failed_files = report.files_failed,
            records = report.records_read,
            rejected = report.records_rejected,
            "Graph build complete"
        );

        Ok(RunOutput {
            graph,
            stats,
            report,
        })
    }
}

/// Build the graph for a configured data directory.
pub fn run_directory(config: &Config) -> Result<RunOutput, IrgError> {
    Orchestrator::new(DirectorySource::new(&config.data_dir)).run()
}
