//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations, providing
//! detailed error handling for projection and write-back failures.

use thiserror::Error;

/// Task projection errors
///
/// Covers the assistant-backed extraction path and the write-back path
/// from task edits into the graph.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Assistant extraction call failed
    #[error("Task extraction failed: {0}")]
    ExtractionFailed(String),

    /// Write-back target does not exist in the graph
    #[error("Unknown node: {id}")]
    UnknownNode { id: String },
}

impl ProjectionError {
    /// Create an extraction failed error
    pub fn extraction_failed(reason: impl Into<String>) -> Self {
        Self::ExtractionFailed(reason.into())
    }

    /// Create an unknown node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }
}
