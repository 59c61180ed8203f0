//! Starter Map
//!
//! Every session opens on the same small seed graph: the user at the center
//! with two anchor areas. Assistant proposals grow the map from here, which
//! is why seed ids are short and stable rather than UUIDs.

use crate::models::{Edge, Node, NodeKind, Position};

/// Build the starter map contents
///
/// Three nodes (me, work, health) and the two edges anchoring the areas to
/// the user. Positions give the layout a sane opening arrangement; the
/// physics takes over from there.
pub fn starter_map() -> (Vec<Node>, Vec<Edge>) {
    let nodes = vec![
        Node::new_with_id("me".to_string(), "Me".to_string(), NodeKind::Person)
            .with_description("Everything connects back to you.".to_string())
            .with_icon("🙂".to_string())
            .with_position(Position::new(0.0, 0.0)),
        Node::new_with_id("work".to_string(), "Work".to_string(), NodeKind::Concept)
            .with_description("Projects, meetings, career.".to_string())
            .with_icon("💼".to_string())
            .with_position(Position::new(220.0, -90.0)),
        Node::new_with_id("health".to_string(), "Health".to_string(), NodeKind::Concept)
            .with_description("Body, mind, habits.".to_string())
            .with_icon("💪".to_string())
            .with_position(Position::new(220.0, 90.0)),
    ];

    let edges = vec![
        Edge::new_with_id("e1".to_string(), "me".to_string(), "work".to_string()),
        Edge::new_with_id("e2".to_string(), "me".to_string(), "health".to_string()),
    ];

    (nodes, edges)
}
