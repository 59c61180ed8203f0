//! Edge Data Structures
//!
//! A directed relation between two nodes. Endpoint integrity is enforced by
//! the reconciler, not here; the model only knows about shape.

use crate::models::node::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed edge of the mind map
///
/// # Examples
///
/// ```rust
/// use mindgraph_core::models::Edge;
///
/// let edge = Edge::new("me".to_string(), "work".to_string());
/// assert!(!edge.id.is_empty());
/// assert!(edge.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier
    pub id: String,

    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Optional relation label shown on the canvas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Create a new Edge with auto-generated UUID
    pub fn new(source: String, target: String) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), source, target)
    }

    /// Create a new Edge with a caller-chosen id
    pub fn new_with_id(id: String, source: String, target: String) -> Self {
        Self {
            id,
            source,
            target,
            label: None,
        }
    }

    /// Set the relation label
    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    /// Validate edge structure
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` if `id`, `source`, or `target`
    /// is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.source.is_empty() {
            return Err(ValidationError::MissingField("source".to_string()));
        }

        if self.target.is_empty() {
            return Err(ValidationError::MissingField("target".to_string()));
        }

        Ok(())
    }
}
