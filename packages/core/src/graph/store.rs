//! In-memory Graph Store
//!
//! The authoritative home of the mind map for one session. Collections are
//! insertion-ordered maps keyed by id, guarded by a tokio `RwLock` so the
//! chat path, the background sync loop, and the view router can share one
//! store.
//!
//! The store is a dumb mutator: duplicate-id inserts are no-ops and unknown
//! targets are logged and dropped, but endpoint integrity for edges is the
//! reconciler's job. Keeping that check out of here keeps every store
//! operation total.

use crate::graph::events::DomainEvent;
use crate::graph::seed;
use crate::models::{Edge, Node, NodePatch, Position};
use indexmap::IndexMap;
use mindgraph_assistant_engine::{EdgeSummary, MapSnapshot, NodeSummary};
use std::collections::HashSet;
use tokio::sync::{broadcast, RwLock};

/// Domain event channel capacity
///
/// 128 provides headroom for burst emission (one proposal can add dozens of
/// nodes) while limiting memory overhead. Observer lag is acceptable since
/// subscribers re-read current state rather than replaying history.
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug, Default)]
struct GraphState {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
}

/// Shared, observable graph state
///
/// # Examples
///
/// ```rust
/// use mindgraph_core::graph::GraphStore;
/// use mindgraph_core::models::{Node, NodeKind};
///
/// #[tokio::main]
/// async fn main() {
///     let store = GraphStore::seeded();
///     assert_eq!(store.node_count().await, 3);
///
///     let added = store
///         .add_node(Node::new("Reading".to_string(), NodeKind::Concept))
///         .await;
///     assert!(added);
/// }
/// ```
#[derive(Debug)]
pub struct GraphStore {
    state: RwLock<GraphState>,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// Create a store preloaded with the starter map
    pub fn seeded() -> Self {
        let (nodes, edges) = seed::starter_map();
        Self::from_parts(nodes, edges)
    }

    /// Create a store from explicit contents
    ///
    /// No events are emitted for the initial contents; subscribers observe
    /// changes, not construction.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut state = GraphState::default();
        for node in nodes {
            state.nodes.insert(node.id.clone(), node);
        }
        for edge in edges {
            state.edges.insert(edge.id.clone(), edge);
        }

        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            state: RwLock::new(state),
            event_tx,
        }
    }

    /// Insert a node, unless its id is already present
    ///
    /// Returns whether the node was inserted. Duplicate ids are a no-op so a
    /// replayed proposal cannot clobber existing state.
    pub async fn add_node(&self, node: Node) -> bool {
        let mut state = self.state.write().await;
        if state.nodes.contains_key(&node.id) {
            tracing::debug!("Ignoring duplicate node add: {}", node.id);
            return false;
        }

        let event = DomainEvent::NodeAdded(node.clone());
        state.nodes.insert(node.id.clone(), node);
        drop(state);

        self.emit_event(event);
        true
    }

    /// Shallow-merge a patch into the node it targets
    ///
    /// Fields absent from the patch are preserved. Returns the updated node,
    /// or `None` when the target does not exist; unknown targets are dropped
    /// with a warning rather than silently.
    pub async fn update_node(&self, patch: &NodePatch) -> Option<Node> {
        let mut state = self.state.write().await;
        match state.nodes.get_mut(&patch.id) {
            Some(node) => {
                node.apply_patch(patch);
                let updated = node.clone();
                drop(state);

                self.emit_event(DomainEvent::NodeUpdated(updated.clone()));
                Some(updated)
            }
            None => {
                tracing::warn!("Dropping update for unknown node: {}", patch.id);
                None
            }
        }
    }

    /// Replace a node wholesale, keyed by its id
    ///
    /// Direct-edit path: the caller hands back the full edited node. Unknown
    /// ids are dropped with a warning, consistent with `update_node`.
    pub async fn replace_node(&self, node: Node) -> Option<Node> {
        let mut state = self.state.write().await;
        if !state.nodes.contains_key(&node.id) {
            tracing::warn!("Dropping replacement for unknown node: {}", node.id);
            return None;
        }

        state.nodes.insert(node.id.clone(), node.clone());
        drop(state);

        self.emit_event(DomainEvent::NodeUpdated(node.clone()));
        Some(node)
    }

    /// Insert an edge, unless its id is already present
    ///
    /// Endpoint existence is not checked here; see the module docs.
    pub async fn add_edge(&self, edge: Edge) -> bool {
        let mut state = self.state.write().await;
        if state.edges.contains_key(&edge.id) {
            tracing::debug!("Ignoring duplicate edge add: {}", edge.id);
            return false;
        }

        let event = DomainEvent::EdgeAdded(edge.clone());
        state.edges.insert(edge.id.clone(), edge);
        drop(state);

        self.emit_event(event);
        true
    }

    /// Write a layout position
    ///
    /// No domain event; position traffic is high-frequency and renderer-local.
    pub async fn update_position(&self, id: &str, position: Position) -> bool {
        let mut state = self.state.write().await;
        match state.nodes.get_mut(id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => {
                tracing::warn!("Dropping position update for unknown node: {}", id);
                false
            }
        }
    }

    /// Get a node by id
    pub async fn get_node(&self, id: &str) -> Option<Node> {
        self.state.read().await.nodes.get(id).cloned()
    }

    pub async fn contains_node(&self, id: &str) -> bool {
        self.state.read().await.nodes.contains_key(id)
    }

    pub async fn contains_edge(&self, id: &str) -> bool {
        self.state.read().await.edges.contains_key(id)
    }

    /// All nodes in insertion order
    pub async fn nodes(&self) -> Vec<Node> {
        self.state.read().await.nodes.values().cloned().collect()
    }

    /// All edges in insertion order
    pub async fn edges(&self) -> Vec<Edge> {
        self.state.read().await.edges.values().cloned().collect()
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.state.read().await.edges.len()
    }

    /// The current node id set
    ///
    /// Snapshot for integrity checks; see the reconciler's connectivity audit.
    pub async fn node_ids(&self) -> HashSet<String> {
        self.state.read().await.nodes.keys().cloned().collect()
    }

    /// Read-only summary for assistant calls
    ///
    /// Carries `{id, label, kind}` per node and `{source, target}` per edge,
    /// nothing else.
    pub async fn snapshot(&self) -> MapSnapshot {
        let state = self.state.read().await;

        MapSnapshot {
            nodes: state
                .nodes
                .values()
                .map(|n| NodeSummary {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    kind: n.kind.to_string(),
                })
                .collect(),
            edges: state
                .edges
                .values()
                .map(|e| EdgeSummary {
                    source: e.source.clone(),
                    target: e.target.clone(),
                })
                .collect(),
        }
    }

    /// Subscribe to domain events
    ///
    /// Returns a broadcast receiver that receives all domain events (node
    /// added, node updated, edge added, tasks resynced).
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a domain event to all subscribers
    ///
    /// Ignores errors if no subscribers (expected in some tests).
    pub(crate) fn emit_event(&self, event: DomainEvent) {
        tracing::debug!("Emitting {}", event.event_type());
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use std::time::Duration;
    use tokio::time::timeout;

    fn task_node(id: &str, label: &str) -> Node {
        Node::new_with_id(id.to_string(), label.to_string(), NodeKind::Task)
    }

    #[tokio::test]
    async fn test_add_node_rejects_duplicate_id() {
        let store = GraphStore::new();

        assert!(store.add_node(task_node("gym", "Gym")).await);
        assert!(!store.add_node(task_node("gym", "Gym again")).await);

        // The original node is untouched
        let node = store.get_node("gym").await.unwrap();
        assert_eq!(node.label, "Gym");
        assert_eq!(store.node_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_node_merges_and_preserves() {
        let store = GraphStore::new();
        store
            .add_node(task_node("gym", "Gym").with_description("lift".to_string()))
            .await;

        let patch = NodePatch::new("gym".to_string()).with_label("Gym sessions".to_string());
        let updated = store.update_node(&patch).await.unwrap();

        assert_eq!(updated.label, "Gym sessions");
        assert_eq!(updated.description, "lift");
    }

    #[tokio::test]
    async fn test_update_unknown_node_is_noop() {
        let store = GraphStore::seeded();
        let before = store.nodes().await;

        let patch = NodePatch::new("ghost".to_string()).with_label("Boo".to_string());
        assert!(store.update_node(&patch).await.is_none());

        assert_eq!(store.nodes().await, before);
    }

    #[tokio::test]
    async fn test_replace_node_swaps_wholesale() {
        let store = GraphStore::seeded();
        let mut rx = store.subscribe_to_events();

        let edited = task_node("me", "Me (2026)").with_description("fresh start".to_string());
        let replaced = store.replace_node(edited).await.unwrap();
        assert_eq!(replaced.label, "Me (2026)");

        let node = store.get_node("me").await.unwrap();
        assert_eq!(node.label, "Me (2026)");
        assert_eq!(node.description, "fresh start");
        assert_eq!(store.node_count().await, 3);

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(event, DomainEvent::NodeUpdated(n) if n.id == "me"));

        // Unknown id is dropped, not inserted
        assert!(store.replace_node(task_node("ghost", "Boo")).await.is_none());
        assert!(!store.contains_node("ghost").await);
    }

    #[tokio::test]
    async fn test_add_edge_rejects_duplicate_id() {
        let store = GraphStore::seeded();

        let edge = Edge::new_with_id("e1".to_string(), "work".to_string(), "health".to_string());
        // e1 already exists in the seed
        assert!(!store.add_edge(edge).await);
        assert_eq!(store.edge_count().await, 2);
    }

    #[tokio::test]
    async fn test_position_update_emits_no_event() {
        let store = GraphStore::seeded();
        let mut rx = store.subscribe_to_events();

        assert!(store.update_position("me", Position::new(5.0, -3.0)).await);
        assert!(!store.update_position("ghost", Position::new(0.0, 0.0)).await);

        let node = store.get_node("me").await.unwrap();
        assert_eq!(node.position, Position::new(5.0, -3.0));

        // Nothing arrived on the event channel
        let outcome = timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_events_emitted_for_mutations() {
        let store = GraphStore::new();
        let mut rx = store.subscribe_to_events();

        store.add_node(task_node("gym", "Gym")).await;
        store
            .add_edge(Edge::new_with_id(
                "e-gym".to_string(),
                "gym".to_string(),
                "gym".to_string(),
            ))
            .await;

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(first, DomainEvent::NodeAdded(n) if n.id == "gym"));

        let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(second, DomainEvent::EdgeAdded(e) if e.id == "e-gym"));
    }

    #[tokio::test]
    async fn test_snapshot_summarizes_state() {
        let store = GraphStore::seeded();
        let snapshot = store.snapshot().await;

        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.edges.len(), 2);
        assert_eq!(snapshot.nodes[0].id, "me");
        assert_eq!(snapshot.nodes[0].kind, "person");
        assert_eq!(snapshot.edges[0].source, "me");
        assert_eq!(snapshot.edges[0].target, "work");
    }

    #[tokio::test]
    async fn test_seeded_store_contents() {
        let store = GraphStore::seeded();

        assert!(store.contains_node("me").await);
        assert!(store.contains_node("work").await);
        assert!(store.contains_node("health").await);
        assert!(store.contains_edge("e1").await);
        assert!(store.contains_edge("e2").await);
    }
}
