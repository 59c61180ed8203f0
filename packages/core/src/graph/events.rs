//! Domain Events for the Graph Store
//!
//! This module defines the domain events emitted by the graph store when
//! state changes. Events follow the observer pattern, letting other parts of
//! the system (the canvas renderer, the task panel, tests) react to changes
//! without coupling to the store implementation.
//!
//! # Event Flow
//!
//! 1. The store performs a mutation (node added, node merged, edge added)
//! 2. A domain event is emitted via tokio's broadcast channel
//! 3. All subscribers receive the event asynchronously
//!
//! The task projection emits `TasksResynced` through the same channel so the
//! UI has a single subscription point.

use crate::models::{Edge, Node};

/// Domain events emitted by the graph store
///
/// These represent domain-level changes, not individual method calls;
/// position writes are deliberately unevented.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new node was inserted
    NodeAdded(Node),

    /// An existing node was merged with a patch or replaced
    NodeUpdated(Node),

    /// A new edge was inserted
    EdgeAdded(Edge),

    /// The task projection was replaced wholesale
    TasksResynced { count: usize },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeAdded(_) => "node:added",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::EdgeAdded(_) => "edge:added",
            DomainEvent::TasksResynced { .. } => "tasks:resynced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, NodeKind};

    #[test]
    fn test_event_type_names() {
        let node = Node::new("Work".to_string(), NodeKind::Concept);

        assert_eq!(
            DomainEvent::NodeAdded(node.clone()).event_type(),
            "node:added"
        );
        assert_eq!(DomainEvent::NodeUpdated(node).event_type(), "node:updated");
        assert_eq!(
            DomainEvent::TasksResynced { count: 3 }.event_type(),
            "tasks:resynced"
        );
    }
}
