/// The external assistant contract
use crate::error::Result;
use crate::types::{AssistantReply, ExtractedTask, MapSnapshot};
use async_trait::async_trait;

/// Boundary trait for the conversational assistant
///
/// The core treats implementations as black boxes: calls may be slow, fail
/// outright, or return junk. Callers own timeouts and fallback behavior;
/// implementations own transport, authentication, and prompt delivery.
#[async_trait]
pub trait AssistantEngine: Send + Sync {
    /// Process one user input against the current map snapshot
    ///
    /// Returns the conversational reply and, when the assistant decided the
    /// input warrants map changes, a change payload for the reconciler.
    async fn process_brain_input(&self, input: &str, map: &MapSnapshot) -> Result<AssistantReply>;

    /// Extract the task list from the current map snapshot
    ///
    /// The returned list is a full replacement, not a delta.
    async fn extract_tasks(&self, map: &MapSnapshot) -> Result<Vec<ExtractedTask>>;
}
