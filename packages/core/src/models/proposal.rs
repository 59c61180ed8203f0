//! Change Proposal Structures
//!
//! A `ChangeProposal` is the validated, typed form of the graph changes one
//! assistant turn suggested. Conversion from the wire shape is lossy on
//! purpose: malformed entries are rejected one at a time, malformed fields
//! are dropped from otherwise usable entries, and every loss is recorded as
//! a [`ProposalDefect`] so one bad entry never sinks the batch.
//!
//! # Entry-level vs field-level
//!
//! - Entry-level rejection: missing id (nodes and edges), missing endpoint
//!   (edges), unknown kind on an add
//! - Field-level drop: unknown kind on an update, unknown priority,
//!   unparseable date or reminder on either path

use crate::models::edge::Edge;
use crate::models::node::{Node, NodeKind, NodePatch, Priority};
use chrono::{NaiveDate, NaiveDateTime};
use mindgraph_assistant_engine::{ProposedChanges, ProposedEdge, ProposedNode, ProposedNodePatch};
use serde::{Deserialize, Serialize};

/// One recorded loss from wire conversion
///
/// Serialized for the UI with an internally-tagged format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProposalDefect {
    /// An entry was rejected outright
    EntryRejected { entry: String, reason: String },

    /// A field was dropped from an otherwise usable entry
    FieldDropped {
        entry: String,
        field: String,
        reason: String,
    },
}

/// A validated batch of graph changes, ready for the reconciler
///
/// Application order is fixed: nodes are added, then updates merged, then
/// edges added, so a well-formed batch can introduce a node and connect it
/// in the same turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposal {
    #[serde(default)]
    pub nodes_to_add: Vec<Node>,

    #[serde(default)]
    pub nodes_to_update: Vec<NodePatch>,

    #[serde(default)]
    pub edges_to_add: Vec<Edge>,

    /// Assistant's own summary of the batch, surfaced to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ChangeProposal {
    /// Create an empty proposal
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the batch
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes_to_add.push(node);
        self
    }

    /// Add a patch to the batch
    pub fn with_patch(mut self, patch: NodePatch) -> Self {
        self.nodes_to_update.push(patch);
        self
    }

    /// Add an edge to the batch
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges_to_add.push(edge);
        self
    }

    /// Set the explanation
    pub fn with_explanation(mut self, explanation: String) -> Self {
        self.explanation = Some(explanation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_to_add.is_empty()
            && self.nodes_to_update.is_empty()
            && self.edges_to_add.is_empty()
    }

    /// Validate wire changes into a typed proposal
    ///
    /// Never fails; whatever could not be salvaged is described in the
    /// returned defect list.
    pub fn from_wire(changes: ProposedChanges) -> (Self, Vec<ProposalDefect>) {
        let mut defects = Vec::new();
        let mut proposal = ChangeProposal::default();

        for (index, wire) in changes.nodes_to_add.into_iter().enumerate() {
            if let Some(node) = convert_node(wire, index, &mut defects) {
                proposal.nodes_to_add.push(node);
            }
        }

        for (index, wire) in changes.nodes_to_update.into_iter().enumerate() {
            if let Some(patch) = convert_patch(wire, index, &mut defects) {
                proposal.nodes_to_update.push(patch);
            }
        }

        for (index, wire) in changes.edges_to_add.into_iter().enumerate() {
            if let Some(edge) = convert_edge(wire, index, &mut defects) {
                proposal.edges_to_add.push(edge);
            }
        }

        proposal.explanation = changes.explanation.filter(|e| !e.trim().is_empty());

        (proposal, defects)
    }
}

/// Human-readable handle for a wire entry, preferring its id when present
fn entry_label(collection: &str, index: usize, id: Option<&str>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => format!("{}[{}] ({})", collection, index, id.trim()),
        _ => format!("{}[{}]", collection, index),
    }
}

fn normalize_id(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn convert_node(
    wire: ProposedNode,
    index: usize,
    defects: &mut Vec<ProposalDefect>,
) -> Option<Node> {
    let entry = entry_label("nodesToAdd", index, wire.id.as_deref());

    // Unknown kind rejects the whole entry; a node of the wrong kind is
    // worse than no node. Absent kind means concept.
    let kind = match wire.kind {
        None => NodeKind::default(),
        Some(raw) => match raw.parse::<NodeKind>() {
            Ok(kind) => kind,
            Err(reason) => {
                tracing::warn!("Rejecting {}: {}", entry, reason);
                defects.push(ProposalDefect::EntryRejected { entry, reason });
                return None;
            }
        },
    };

    let id = normalize_id(wire.id);
    let label = wire
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| id.clone());

    let mut node = Node::new_with_id(id, label, kind);
    node.description = wire.description.unwrap_or_default();
    node.icon = wire.icon.filter(|i| !i.trim().is_empty());
    node.date = parse_date(wire.date, &entry, "date", defects);
    node.reminder_date = parse_datetime(wire.reminder_date, &entry, "reminderDate", defects);
    node.is_completed = wire.is_completed;
    node.priority = parse_priority(wire.priority, &entry, "priority", defects);

    if let Err(err) = node.validate() {
        tracing::warn!("Rejecting {}: {}", entry, err);
        defects.push(ProposalDefect::EntryRejected {
            entry,
            reason: err.to_string(),
        });
        return None;
    }

    Some(node)
}

fn convert_patch(
    wire: ProposedNodePatch,
    index: usize,
    defects: &mut Vec<ProposalDefect>,
) -> Option<NodePatch> {
    let entry = entry_label("nodesToUpdate", index, wire.id.as_deref());

    let id = normalize_id(wire.id);
    if id.is_empty() {
        tracing::warn!("Rejecting {}: missing target id", entry);
        defects.push(ProposalDefect::EntryRejected {
            entry,
            reason: "missing target id".to_string(),
        });
        return None;
    }

    let mut patch = NodePatch::new(id);
    patch.label = wire.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
    patch.description = wire.description;

    // Unknown kind on an update drops the field, not the entry; the rest of
    // the patch is still worth applying.
    if let Some(raw) = wire.kind {
        match raw.parse::<NodeKind>() {
            Ok(kind) => patch.kind = Some(kind),
            Err(reason) => {
                tracing::warn!("Dropping kind from {}: {}", entry, reason);
                defects.push(ProposalDefect::FieldDropped {
                    entry: entry.clone(),
                    field: "kind".to_string(),
                    reason,
                });
            }
        }
    }

    patch.icon = wire.icon;

    patch.date = match wire.date {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => parse_date(Some(raw), &entry, "date", defects).map(Some),
    };

    patch.reminder_date = match wire.reminder_date {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => parse_datetime(Some(raw), &entry, "reminderDate", defects).map(Some),
    };

    patch.is_completed = wire.is_completed;

    patch.priority = match wire.priority {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => parse_priority(Some(raw), &entry, "priority", defects).map(Some),
    };

    Some(patch)
}

fn convert_edge(
    wire: ProposedEdge,
    index: usize,
    defects: &mut Vec<ProposalDefect>,
) -> Option<Edge> {
    let entry = entry_label("edgesToAdd", index, wire.id.as_deref());

    let edge = Edge {
        id: normalize_id(wire.id),
        source: normalize_id(wire.source),
        target: normalize_id(wire.target),
        label: wire.label.filter(|l| !l.trim().is_empty()),
    };

    if let Err(err) = edge.validate() {
        tracing::warn!("Rejecting {}: {}", entry, err);
        defects.push(ProposalDefect::EntryRejected {
            entry,
            reason: err.to_string(),
        });
        return None;
    }

    Some(edge)
}

fn parse_date(
    raw: Option<String>,
    entry: &str,
    field: &str,
    defects: &mut Vec<ProposalDefect>,
) -> Option<NaiveDate> {
    let raw = raw?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!("Dropping {} from {}: unparseable date {:?}", field, entry, raw);
            defects.push(ProposalDefect::FieldDropped {
                entry: entry.to_string(),
                field: field.to_string(),
                reason: format!("unparseable date: {}", raw),
            });
            None
        }
    }
}

fn parse_datetime(
    raw: Option<String>,
    entry: &str,
    field: &str,
    defects: &mut Vec<ProposalDefect>,
) -> Option<NaiveDateTime> {
    let raw = raw?;
    let trimmed = raw.trim();
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"));
    match parsed {
        Ok(datetime) => Some(datetime),
        Err(_) => {
            tracing::warn!(
                "Dropping {} from {}: unparseable date-time {:?}",
                field,
                entry,
                raw
            );
            defects.push(ProposalDefect::FieldDropped {
                entry: entry.to_string(),
                field: field.to_string(),
                reason: format!("unparseable date-time: {}", raw),
            });
            None
        }
    }
}

fn parse_priority(
    raw: Option<String>,
    entry: &str,
    field: &str,
    defects: &mut Vec<ProposalDefect>,
) -> Option<Priority> {
    let raw = raw?;
    match raw.parse::<Priority>() {
        Ok(priority) => Some(priority),
        Err(reason) => {
            tracing::warn!("Dropping {} from {}: {}", field, entry, reason);
            defects.push(ProposalDefect::FieldDropped {
                entry: entry.to_string(),
                field: field.to_string(),
                reason,
            });
            None
        }
    }
}
