//! Run report and plain-text graph listing

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

use irg_graph::{IdentityGraph, NodeKind, Stats};

use crate::orchestrator::{RunOutput, RunReport};

/// Final report: graph counts, run counters and stats.
pub fn format_report(output: &RunOutput) -> String {
    let mut out = String::new();
    let summary = output.graph.summary();

    // Writing to a String cannot fail
    let _ = writeln!(out, "num nodes {}", summary.nodes);
    let _ = writeln!(out, "num edges {}", summary.edges);
    let _ = writeln!(
        out,
        "identities {}, resources {}, edge events {}",
        summary.identities, summary.resources, summary.edge_events
    );
    out.push_str(&format_run_counters(&output.report));
    out.push_str(&output.stats.summary());
    out.push_str(&format_stats_detail(&output.stats));
    out
}

fn format_run_counters(report: &RunReport) -> String {
    format!(
        "files {} (failed {}), records {} (linked {}, errors {}, filtered {}, rejected {})\n",
        report.files_scanned,
        report.files_failed,
        report.records_read,
        report.linked_records,
        report.error_records,
        report.filtered_records,
        report.records_rejected,
    )
}

/// Identity types and error codes with their message prefixes.
pub fn format_stats_detail(stats: &Stats) -> String {
    let mut out = String::new();
    let types: Vec<&str> = stats.identity_types.iter().map(String::as_str).collect();
    let _ = writeln!(out, "userIdentity.type: {{{}}}", types.join(", "));
    for (code, messages) in &stats.error_code_messages {
        let _ = writeln!(out, "errorCode {} ({} messages)", code, messages.len());
        for message in messages {
            let _ = writeln!(out, "  - {}", message);
        }
    }
    out
}

/// Write each identity with the resources it touched.
///
/// A node is listed as an identity when it was registered as one or acted as
/// one on any edge, so a resource that later makes calls still shows its
/// outgoing links. A record naming its own actor lists the node under itself.
pub fn render_graph<W: Write>(graph: &IdentityGraph, out: &mut W) -> io::Result<()> {
    let mut adjacency: BTreeMap<usize, Vec<(usize, usize)>> = graph
        .nodes()
        .filter(|node| node.kind() == NodeKind::UserIdentity)
        .map(|node| (node.index, Vec::new()))
        .collect();
    for edge in graph.edges() {
        adjacency
            .entry(edge.identity)
            .or_default()
            .push((edge.resource, edge.event_count()));
    }

    for (identity, resources) in adjacency.iter_mut() {
        let key = graph.node(*identity).map(|n| n.key()).unwrap_or_default();
        writeln!(out, "[{}] {}", identity, key)?;

        if resources.is_empty() {
            writeln!(out, "  (no resources)")?;
            continue;
        }
        resources.sort_unstable();
        for (position, (resource, events)) in resources.iter().enumerate() {
            let branch = if position + 1 == resources.len() {
                "└─"
            } else {
                "├─"
            };
            let key = graph.node(*resource).map(|n| n.key()).unwrap_or_default();
            writeln!(out, "  {} [{}] {} ({} events)", branch, resource, key, events)?;
        }
    }
    Ok(())
}
