//! # IRG Graph
//!
//! Identity relationship graph accumulation for cloud audit-trail records.
//!
//! Records are folded one at a time into an undirected graph that connects
//! IAM user identities to the resources they acted upon. Every edge carries
//! the list of records that connected (or re-confirmed) the pair. Alongside
//! the graph, a [`Stats`] accumulator tracks distinct event names, identity
//! types and error messages per error code.
//!
//! ## Modules
//!
//! - [`records`]: Typed audit record model
//! - [`stats`]: Summary statistics accumulator
//! - [`graph`]: Graph state and the record-folding builder
//! - [`errors`]: Per-record error types

pub mod errors;
pub mod graph;
pub mod records;
pub mod stats;

pub use errors::RecordError;
pub use graph::{
    fold_record, EdgeData, EdgeView, GraphBuilder, GraphSummary, IdentityGraph, NodeData, NodeKind,
    NodeView, RecordOutcome,
};
pub use records::{Record, Resource, UserIdentity};
pub use stats::Stats;

/// Identity type that participates in the graph.
pub const IAM_USER_TYPE: &str = "IAMUser";

/// Identity type recorded when a record carries none.
pub const UNKNOWN_IDENTITY_TYPE: &str = "unknown";
