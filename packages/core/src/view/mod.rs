//! View Capability Layer
//!
//! Narrow seams between a host UI and the core. Viewport control is an
//! explicit handle instead of global mutable state, and host input (drag,
//! speech) arrives as tagged events routed to the service that owns the
//! side effect. The core stays decoupled from any specific host API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::GraphStore;
use crate::models::Position;
use crate::services::{ChatOutcome, ChatSession};

/// Viewport control surface of a layout component
///
/// Implemented by the rendering host and passed as a handle to callers that
/// need view control, keeping the dependency visible and testable.
pub trait ViewportControls: Send + Sync {
    /// Multiply the current zoom by `factor`
    fn zoom(&self, factor: f64);

    /// Shift the viewport by screen-space deltas
    fn pan(&self, dx: f64, dy: f64);

    /// Reset to the default viewport
    fn home(&self);
}

/// Host input as explicit tagged events
///
/// Drag events carry the dragged node and its current graph-space
/// coordinates; speech events carry the finalized transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    DragStart {
        id: String,
        x: f64,
        y: f64,
    },
    DragMove {
        id: String,
        x: f64,
        y: f64,
    },
    DragEnd {
        id: String,
        x: f64,
        y: f64,
    },
    SpeechResult {
        #[serde(rename = "finalText")]
        final_text: String,
    },
}

/// What the router did with an event
#[derive(Debug)]
pub enum RouterOutcome {
    /// Drag position written to the node
    PositionUpdated,
    /// Drag referenced a node that is not in the graph
    UnknownNode,
    /// Event carried nothing actionable
    Ignored,
    /// Speech was submitted as a chat turn
    Chat(ChatOutcome),
}

/// Routes host input events to the owning service
///
/// Every drag phase writes the carried position straight onto the node
/// (position writes are renderer-local and emit no domain event). Finalized
/// speech becomes a chat turn.
pub struct InputRouter {
    store: Arc<GraphStore>,
    session: Arc<ChatSession>,
}

impl InputRouter {
    pub fn new(store: Arc<GraphStore>, session: Arc<ChatSession>) -> Self {
        Self { store, session }
    }

    /// Route one event. Total: malformed or unroutable input degrades to
    /// [`RouterOutcome::Ignored`] or [`RouterOutcome::UnknownNode`], never
    /// an error.
    pub async fn route(&self, event: InputEvent) -> RouterOutcome {
        match event {
            InputEvent::DragStart { id, x, y }
            | InputEvent::DragMove { id, x, y }
            | InputEvent::DragEnd { id, x, y } => {
                let position = Position::new(x, y);
                if !position.is_finite() {
                    tracing::warn!("Ignoring drag with non-finite coordinates for {}", id);
                    return RouterOutcome::Ignored;
                }
                if self.store.update_position(&id, position).await {
                    RouterOutcome::PositionUpdated
                } else {
                    RouterOutcome::UnknownNode
                }
            }
            InputEvent::SpeechResult { final_text } => {
                let text = final_text.trim();
                if text.is_empty() {
                    tracing::debug!("Ignoring empty speech result");
                    return RouterOutcome::Ignored;
                }
                RouterOutcome::Chat(self.session.process_input(text).await)
            }
        }
    }
}
