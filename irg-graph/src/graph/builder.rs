//! Record folding
//!
//! Each record updates the stats unconditionally, then either stops (error
//! records, non-IAM-user actors) or links its identity to every resource it
//! touched. Key preconditions are checked before the graph is touched, so a
//! malformed record never leaves a half-linked identity behind.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{IdentityGraph, NodeKind};
use crate::errors::RecordError;
use crate::records::Record;
use crate::stats::Stats;
use crate::IAM_USER_TYPE;

/// What a record contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Failed API call; counted into stats only
    ErrorRecord { error_code: String },

    /// Actor is not an IAM user; counted into stats only
    NotIamUser { identity_type: String },

    /// Identity resolved and linked to each resource
    Linked {
        identity: usize,
        /// Distinct resource node indices in record order
        resources: Vec<usize>,
        nodes_added: usize,
        edges_added: usize,
    },
}

/// Fold one record into the graph and stats.
///
/// Errors describe records that could not be linked; stats have already been
/// updated for them and the caller is expected to log and continue.
pub fn fold_record(
    graph: &mut IdentityGraph,
    stats: &mut Stats,
    record: Record,
) -> Result<RecordOutcome, RecordError> {
    stats.record_identity_type(
        record
            .user_identity
            .as_ref()
            .and_then(|identity| identity.identity_type.as_deref()),
    );
    if let Some(event_name) = &record.event_name {
        stats.record_event_name(event_name);
    }

    if let Some(error_code) = &record.error_code {
        stats.record_error(error_code, record.error_message.as_deref());
        return Ok(RecordOutcome::ErrorRecord {
            error_code: error_code.clone(),
        });
    }

    if record.identity_type() != IAM_USER_TYPE {
        return Ok(RecordOutcome::NotIamUser {
            identity_type: record.identity_type().to_string(),
        });
    }

    let record = Arc::new(record);
    let event_name = record.event_name_or_default();

    let Some(identity) = record.user_identity.as_ref() else {
        return Err(RecordError::missing_identity_key(event_name));
    };
    let Some(identity_key) = identity.key() else {
        return Err(RecordError::missing_identity_key(event_name));
    };

    let resource_keys = record
        .resources()
        .iter()
        .enumerate()
        .map(|(position, resource)| {
            resource
                .arn
                .as_deref()
                .ok_or_else(|| RecordError::missing_resource_arn(event_name, position))
        })
        .collect::<Result<Vec<&str>, RecordError>>()?;

    let mut nodes_added = 0;
    let mut edges_added = 0;

    let (identity_index, created) =
        graph.resolve_or_insert(NodeKind::UserIdentity, identity_key, || identity.to_map());
    if created {
        nodes_added += 1;
        log_node_added(graph, NodeKind::UserIdentity, event_name, identity_index);
    }

    let mut resources = Vec::with_capacity(resource_keys.len());
    let mut linked = HashSet::with_capacity(resource_keys.len());
    for (resource, key) in record.resources().iter().zip(resource_keys) {
        let (resource_index, created) =
            graph.resolve_or_insert(NodeKind::Resource, key, || resource.to_map());
        if created {
            nodes_added += 1;
            log_node_added(graph, NodeKind::Resource, event_name, resource_index);
        }

        // A record naming the same resource twice is still one event on its edge
        if !linked.insert(resource_index) {
            continue;
        }

        if graph.upsert_edge(identity_index, resource_index, Arc::clone(&record)) {
            edges_added += 1;
        } else {
            debug!(
                identity = identity_index,
                resource = resource_index,
                event_name,
                "Appended event to existing edge"
            );
        }
        resources.push(resource_index);
    }

    Ok(RecordOutcome::Linked {
        identity: identity_index,
        resources,
        nodes_added,
        edges_added,
    })
}

fn log_node_added(graph: &IdentityGraph, kind: NodeKind, event_name: &str, index: usize) {
    if let Some(node) = graph.node(index) {
        let attributes = Value::Object(node.attributes().clone());
        info!("adding {}: node {} {} at {}", kind, event_name, attributes, index);
    }
}

/// Owns the running graph and stats for one pass over a record stream.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: IdentityGraph,
    stats: Stats,
}

impl GraphBuilder {
    /// Start from an empty graph and fresh stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a decoded record
    pub fn process(&mut self, record: Record) -> Result<RecordOutcome, RecordError> {
        fold_record(&mut self.graph, &mut self.stats, record)
    }

    /// Decode and fold a raw record
    pub fn process_value(&mut self, value: Value) -> Result<RecordOutcome, RecordError> {
        self.process_raw(&value)
    }

    /// Decode and fold a borrowed raw record.
    ///
    /// A record that fails to decode still contributes whatever stats fields
    /// are readable before it is rejected.
    pub fn process_raw(&mut self, value: &Value) -> Result<RecordOutcome, RecordError> {
        match Record::deserialize(value) {
            Ok(record) => self.process(record),
            Err(e) => {
                self.stats.record_raw(value);
                Err(e.into())
            }
        }
    }

    pub fn graph(&self) -> &IdentityGraph {
        &self.graph
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Finish the pass
    pub fn into_parts(self) -> (IdentityGraph, Stats) {
        (self.graph, self.stats)
    }
}

