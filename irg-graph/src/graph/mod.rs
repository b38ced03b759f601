//! Identity/resource graph
//!
//! - `IdentityGraph`: undirected graph of identities and resources with a
//!   key registry and read-only views
//! - `GraphBuilder`: folds records into an `IdentityGraph` and `Stats`

mod builder;
mod state;

pub use builder::{fold_record, GraphBuilder, RecordOutcome};
pub use state::{
    EdgeData, EdgeView, GraphSummary, IdentityGraph, NodeData, NodeKind, NodeView, NODE_TYPE_KEY,
};
