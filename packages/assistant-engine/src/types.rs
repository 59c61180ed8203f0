/// Wire types crossing the assistant boundary
///
/// Outbound: `MapSnapshot`, the read-only summary of the mind map included in
/// every assistant call. Inbound: `AssistantReply` and its payload structs.
/// Inbound data is untrusted: every field is optional, enum values and dates
/// travel as raw strings, and validation happens in the consumer.
use serde::{Deserialize, Deserializer, Serialize};

/// Read-only node summary included in a map snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    pub label: String,
    pub kind: String,
}

/// Read-only edge summary included in a map snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSummary {
    pub source: String,
    pub target: String,
}

/// The view of the mind map sent with every assistant call
///
/// Carries just enough for the model to reference existing nodes by id:
/// no positions, no descriptions, no task fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<EdgeSummary>,
}

impl MapSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy limited to the first `max_nodes` nodes
    ///
    /// Edges with an endpoint outside the retained set are dropped so the
    /// truncated snapshot never references a node the model cannot see.
    pub fn truncated(&self, max_nodes: usize) -> MapSnapshot {
        if self.nodes.len() <= max_nodes {
            return self.clone();
        }

        let nodes: Vec<NodeSummary> = self.nodes.iter().take(max_nodes).cloned().collect();
        let retained: std::collections::HashSet<&str> =
            nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| retained.contains(e.source.as_str()) && retained.contains(e.target.as_str()))
            .cloned()
            .collect();

        MapSnapshot { nodes, edges }
    }
}

/// A parsed assistant turn: conversational reply plus optional change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    /// Text shown to the user
    pub reply: String,

    /// Structured changes the assistant wants applied, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_changes: Option<ProposedChanges>,
}

impl AssistantReply {
    /// Plain conversational reply with no change payload
    pub fn text_only(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            suggested_changes: None,
        }
    }
}

/// Batch of graph changes suggested in one assistant turn
///
/// Every collection may be absent or empty on the wire; absent collections
/// deserialize to empty so consumers never branch on missing arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChanges {
    #[serde(default)]
    pub nodes_to_add: Vec<ProposedNode>,

    #[serde(default)]
    pub nodes_to_update: Vec<ProposedNodePatch>,

    #[serde(default)]
    pub edges_to_add: Vec<ProposedEdge>,

    /// Assistant's own summary of what the batch does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ProposedChanges {
    pub fn is_empty(&self) -> bool {
        self.nodes_to_add.is_empty()
            && self.nodes_to_update.is_empty()
            && self.edges_to_add.is_empty()
    }

    /// Total number of entries across all three collections
    pub fn entry_count(&self) -> usize {
        self.nodes_to_add.len() + self.nodes_to_update.len() + self.edges_to_add.len()
    }
}

/// A node the assistant wants added, as it arrives on the wire
///
/// Only `id` is required downstream; everything else may be missing or
/// malformed and is validated by the consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Raw kind string, expected to be one of the five node kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Calendar date as `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Local date-time as `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,

    /// Raw priority string, expected to be high | medium | low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Deserializes a nullable wire field into the double-Option pattern
///
/// Maps three input formats:
/// - Missing field → None (don't update)
/// - null → Some(None) (clear the field)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Accept either T or null from JSON
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// A partial node update, as it arrives on the wire
///
/// Nullable fields use the double-Option pattern so a turn can clear a value
/// (explicit null) without every other turn having to restate it (absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedNodePatch {
    /// Target node id; entries without one cannot be applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Raw kind string, validated by the consumer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Update or clear the icon
    ///
    /// - `None`: don't change icon
    /// - `Some(None)`: clear icon
    /// - `Some(Some(icon))`: set icon
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub icon: Option<Option<String>>,

    /// Update or clear the calendar date, raw `YYYY-MM-DD` string
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub date: Option<Option<String>>,

    /// Update or clear the reminder date-time, raw string
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub reminder_date: Option<Option<String>>,

    /// Update or clear the completion flag
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub is_completed: Option<Option<bool>>,

    /// Update or clear the priority, raw string
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub priority: Option<Option<String>>,
}

/// An edge the assistant wants added, as it arrives on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEdge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One entry of a task-extraction reply
///
/// `node_id` links the entry back to the graph node it was derived from;
/// entries that fail to resolve are dropped by the projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Raw `YYYY-MM-DD` string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Raw local date-time string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,

    /// Raw urgency string, expected to be high | medium | low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    /// Originating graph node id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}
