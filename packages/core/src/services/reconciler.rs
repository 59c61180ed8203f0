//! Change Proposal Reconciler
//!
//! Applies an assistant change proposal to the graph store in a fixed order:
//! nodes first, then patches, then edges. An edge inserted before its
//! endpoints would dangle, so the order is part of the contract. Every entry
//! is checked individually and the outcome is collected into an
//! [`ApplyReport`]; applying never fails as a whole.
//!
//! # Architecture
//!
//! The store itself stays a dumb mutator (duplicate inserts are no-ops,
//! unknown patch targets are dropped). The reconciler is the layer that
//! *observes* those outcomes, enforces the endpoint policy, and audits
//! connectivity of the nodes a proposal introduced. Replaying a proposal is
//! harmless: every entry skips on the id checks and the second report
//! [`is_noop`](ApplyReport::is_noop).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::GraphStore;
use crate::models::{ChangeProposal, Edge};

/// Endpoint handling for proposed edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Reject edges naming an endpoint that is absent even after this
    /// proposal's node insertions. The store never holds a dangling edge.
    Strict,
    /// Insert edges unconditionally and record the gap on the report.
    Permissive,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        EdgePolicy::Strict
    }
}

/// Why a proposal entry was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SkipReason {
    /// A node with this id is already in the graph
    DuplicateNode,
    /// The patch targets an id that is not in the graph
    UnknownTarget,
    /// An edge with this id is already in the graph
    DuplicateEdge,
    /// The edge names an endpoint that is not in the graph
    DanglingEndpoint { endpoint: String },
}

/// A proposal entry that was checked but not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedChange {
    /// Position of the entry in the proposal, e.g. `edgesToAdd[1] (e7)`
    pub entry: String,
    pub reason: SkipReason,
}

/// Outcome of applying one proposal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub nodes_added: usize,
    pub nodes_updated: usize,
    pub edges_added: usize,
    /// Entries that were checked but not applied
    #[serde(default)]
    pub skipped: Vec<SkippedChange>,
    /// Nodes added by this proposal that are unreachable from the
    /// pre-existing graph (edges treated as undirected)
    #[serde(default)]
    pub disconnected: Vec<String>,
    /// Edges inserted with a missing endpoint under [`EdgePolicy::Permissive`]
    #[serde(default)]
    pub dangling_edges: Vec<String>,
    /// Assistant's explanation of the proposal, carried through for the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ApplyReport {
    /// True when the proposal changed nothing. Skips do not count as
    /// changes, so replaying an already-applied proposal is a no-op.
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0 && self.nodes_updated == 0 && self.edges_added == 0
    }

    /// Total number of entries that took effect
    pub fn applied_count(&self) -> usize {
        self.nodes_added + self.nodes_updated + self.edges_added
    }
}

/// Applies change proposals to a [`GraphStore`]
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mindgraph_core::graph::GraphStore;
/// use mindgraph_core::models::{ChangeProposal, Edge, Node, NodeKind};
/// use mindgraph_core::services::Reconciler;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(GraphStore::seeded());
///     let reconciler = Reconciler::new(Arc::clone(&store));
///
///     let proposal = ChangeProposal::new()
///         .with_node(Node::new_with_id("gym".to_string(), "Gym".to_string(), NodeKind::Concept))
///         .with_edge(Edge::new_with_id("e3".to_string(), "health".to_string(), "gym".to_string()));
///
///     let report = reconciler.apply(proposal).await;
///     assert_eq!(report.nodes_added, 1);
///     assert_eq!(report.edges_added, 1);
///     assert!(report.skipped.is_empty());
/// }
/// ```
pub struct Reconciler {
    store: Arc<GraphStore>,
    policy: EdgePolicy,
}

impl Reconciler {
    /// Create a reconciler with the default strict edge policy
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self::with_policy(store, EdgePolicy::default())
    }

    /// Create a reconciler with an explicit edge policy
    pub fn with_policy(store: Arc<GraphStore>, policy: EdgePolicy) -> Self {
        Self { store, policy }
    }

    /// The endpoint policy this reconciler was built with
    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Apply a proposal entry by entry and report what happened.
    ///
    /// Malformed or conflicting entries are skipped individually; the rest
    /// of the proposal still lands. There is no rollback: a proposal that
    /// half-applies leaves the store partially updated but never corrupted.
    pub async fn apply(&self, proposal: ChangeProposal) -> ApplyReport {
        let mut report = ApplyReport {
            explanation: proposal.explanation,
            ..ApplyReport::default()
        };

        // Snapshot the id set before any mutation. These are the roots of
        // the connectivity audit at the end.
        let preexisting = self.store.node_ids().await;
        let mut known_ids = preexisting.clone();
        let mut added_ids: Vec<String> = Vec::new();

        for (index, node) in proposal.nodes_to_add.into_iter().enumerate() {
            let id = node.id.clone();
            if self.store.add_node(node).await {
                known_ids.insert(id.clone());
                added_ids.push(id);
                report.nodes_added += 1;
            } else {
                report.skipped.push(SkippedChange {
                    entry: entry_label("nodesToAdd", index, &id),
                    reason: SkipReason::DuplicateNode,
                });
            }
        }

        for (index, patch) in proposal.nodes_to_update.into_iter().enumerate() {
            match self.store.update_node(&patch).await {
                Some(_) => report.nodes_updated += 1,
                None => report.skipped.push(SkippedChange {
                    entry: entry_label("nodesToUpdate", index, &patch.id),
                    reason: SkipReason::UnknownTarget,
                }),
            }
        }

        for (index, edge) in proposal.edges_to_add.into_iter().enumerate() {
            let entry = entry_label("edgesToAdd", index, &edge.id);

            if self.store.contains_edge(&edge.id).await {
                report.skipped.push(SkippedChange {
                    entry,
                    reason: SkipReason::DuplicateEdge,
                });
                continue;
            }

            if let Some(endpoint) = missing_endpoint(&edge, &known_ids) {
                match self.policy {
                    EdgePolicy::Strict => {
                        tracing::warn!(
                            "Rejecting edge {} with missing endpoint {}",
                            edge.id,
                            endpoint
                        );
                        report.skipped.push(SkippedChange {
                            entry,
                            reason: SkipReason::DanglingEndpoint { endpoint },
                        });
                        continue;
                    }
                    EdgePolicy::Permissive => {
                        tracing::warn!(
                            "Inserting edge {} despite missing endpoint {}",
                            edge.id,
                            endpoint
                        );
                        report.dangling_edges.push(edge.id.clone());
                    }
                }
            }

            if self.store.add_edge(edge).await {
                report.edges_added += 1;
            } else {
                report.skipped.push(SkippedChange {
                    entry,
                    reason: SkipReason::DuplicateEdge,
                });
            }
        }

        // Audit connectivity of the nodes this proposal introduced. An empty
        // pre-existing graph has no component to anchor to, so the audit
        // only runs against a populated store.
        if !preexisting.is_empty() && !added_ids.is_empty() {
            let edges = self.store.edges().await;
            report.disconnected = unreachable_nodes(&preexisting, &added_ids, &edges);
            for id in &report.disconnected {
                tracing::warn!("Node {} is not connected to the existing map", id);
            }
        }

        tracing::debug!(
            "Proposal applied: {} added, {} updated, {} edges, {} skipped",
            report.nodes_added,
            report.nodes_updated,
            report.edges_added,
            report.skipped.len()
        );

        report
    }
}

fn entry_label(list: &str, index: usize, id: &str) -> String {
    format!("{}[{}] ({})", list, index, id)
}

fn missing_endpoint(edge: &Edge, known_ids: &HashSet<String>) -> Option<String> {
    if !known_ids.contains(&edge.source) {
        Some(edge.source.clone())
    } else if !known_ids.contains(&edge.target) {
        Some(edge.target.clone())
    } else {
        None
    }
}

/// Breadth-first walk over undirected edges from every pre-existing node,
/// returning the added ids the walk never reached.
fn unreachable_nodes(
    preexisting: &HashSet<String>,
    added: &[String],
    edges: &[Edge],
) -> Vec<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut visited: HashSet<&str> = preexisting.iter().map(String::as_str).collect();
    let mut queue: VecDeque<&str> = visited.iter().copied().collect();

    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    added
        .iter()
        .filter(|id| !visited.contains(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;
