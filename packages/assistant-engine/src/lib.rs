/// MindGraph Assistant Engine - Conversational Boundary for the Mind Map
///
/// This crate defines the contract between the MindGraph core and whatever
/// model provider answers on its behalf: the read-only map snapshot sent
/// outbound, the untrusted wire types coming back, prompt construction for
/// live engines, and parsing that degrades gracefully when the model answers
/// in prose instead of JSON.
///
/// # Features
///
/// - **Engine trait**: one async seam (`process_brain_input`, `extract_tasks`)
///   the core orchestrates against
/// - **Defensive wire types**: every inbound field optional, enums and dates
///   as raw strings, validation left to the consumer
/// - **Fallback parsing**: bare JSON, fenced blocks, embedded objects, plain
///   text all produce a usable reply
/// - **Scripted engine**: canned raw responses routed through the real
///   parser, for tests and offline runs
///
/// # Example
///
/// ```ignore
/// use mindgraph_assistant_engine::{AssistantEngine, MapSnapshot, ScriptedAssistant};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let assistant = ScriptedAssistant::new();
///     assistant.push_reply(r#"{"reply": "Hello!"}"#).await;
///
///     let reply = assistant
///         .process_brain_input("hi", &MapSnapshot::new())
///         .await?;
///     println!("{}", reply.reply);
///
///     Ok(())
/// }
/// ```
pub mod config;
pub mod engine;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod scripted;
pub mod types;

// Re-export main types
pub use config::AssistantConfig;
pub use engine::AssistantEngine;
pub use error::{AssistantError, Result};
pub use parse::{parse_reply, parse_task_list};
pub use scripted::ScriptedAssistant;
pub use types::{
    AssistantReply, EdgeSummary, ExtractedTask, MapSnapshot, NodeSummary, ProposedChanges,
    ProposedEdge, ProposedNode, ProposedNodePatch,
};
