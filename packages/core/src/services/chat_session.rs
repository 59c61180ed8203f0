//! Chat Session
//!
//! Orchestrates one conversational turn end to end: snapshot the graph, call
//! the assistant, validate the suggested changes into a proposal, reconcile
//! it into the store, and record the exchange in a bounded transcript.
//!
//! # Architecture
//!
//! The session never surfaces an assistant failure to the caller as an
//! error. A failed or timed-out call produces [`FALLBACK_REPLY`] with no
//! graph mutation; the application stays usable. Duplicate submission while
//! a turn is in flight is gated by a busy flag and returns
//! [`ChatOutcome::Busy`] without touching the assistant. The flag does not
//! gate the background task resync.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mindgraph_assistant_engine::AssistantEngine;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::graph::GraphStore;
use crate::models::{ChangeProposal, ProposalDefect};
use crate::services::reconciler::{ApplyReport, EdgePolicy, Reconciler};

/// Reply surfaced when the assistant call fails or times out
pub const FALLBACK_REPLY: &str =
    "I encountered an error processing that request. Please try again.";

/// Configuration for chat turns
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Upper bound on one assistant call
    pub assistant_timeout: Duration,
    /// Maximum number of transcript entries kept in memory
    pub transcript_limit: usize,
    /// Endpoint policy for proposed edges
    pub edge_policy: EdgePolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_timeout: Duration::from_secs(30),
            transcript_limit: 200,
            edge_policy: EdgePolicy::default(),
        }
    }
}

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    fn new(role: ChatRole, text: String) -> Self {
        Self {
            role,
            text,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of submitting one chat input
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// A turn is already in flight; this input was not processed
    Busy,
    /// The turn completed, possibly with the fallback reply
    Replied {
        /// Assistant's conversational reply
        reply: String,
        /// Result of applying the suggested changes, when any were proposed
        report: Option<ApplyReport>,
        /// Wire entries rejected or coerced during validation
        defects: Vec<ProposalDefect>,
    },
}

/// Conversational orchestrator over a [`GraphStore`]
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mindgraph_core::graph::GraphStore;
/// use mindgraph_core::services::{ChatOutcome, ChatSession};
/// use mindgraph_assistant_engine::ScriptedAssistant;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(GraphStore::seeded());
///     let session = ChatSession::new(Arc::clone(&store), Arc::new(ScriptedAssistant::new()));
///
///     match session.process_input("add a gym branch").await {
///         ChatOutcome::Replied { reply, .. } => assert!(!reply.is_empty()),
///         ChatOutcome::Busy => unreachable!(),
///     }
/// }
/// ```
pub struct ChatSession {
    store: Arc<GraphStore>,
    engine: Arc<dyn AssistantEngine>,
    reconciler: Reconciler,
    is_processing: AtomicBool,
    transcript: RwLock<Vec<ChatTurn>>,
    config: ChatConfig,
}

impl ChatSession {
    /// Create a session with the default configuration
    pub fn new(store: Arc<GraphStore>, engine: Arc<dyn AssistantEngine>) -> Self {
        Self::with_config(store, engine, ChatConfig::default())
    }

    /// Create a session with an explicit configuration
    pub fn with_config(
        store: Arc<GraphStore>,
        engine: Arc<dyn AssistantEngine>,
        config: ChatConfig,
    ) -> Self {
        let reconciler = Reconciler::with_policy(Arc::clone(&store), config.edge_policy);
        Self {
            store,
            engine,
            reconciler,
            is_processing: AtomicBool::new(false),
            transcript: RwLock::new(Vec::new()),
            config,
        }
    }

    /// True while a chat turn is in flight
    pub fn is_processing(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    /// Current transcript, oldest entry first
    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.transcript.read().await.clone()
    }

    /// Submit one user input and drive the full turn.
    ///
    /// Returns [`ChatOutcome::Busy`] if another turn is already in flight.
    /// Otherwise the assistant is called under the configured timeout, the
    /// suggested changes (if any) are validated and applied, and both sides
    /// of the exchange are appended to the transcript.
    pub async fn process_input(&self, input: &str) -> ChatOutcome {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Chat turn already in flight, rejecting input");
            return ChatOutcome::Busy;
        }

        let outcome = self.run_turn(input).await;
        self.is_processing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_turn(&self, input: &str) -> ChatOutcome {
        self.push_turn(ChatRole::User, input.to_string()).await;

        let snapshot = self.store.snapshot().await;
        let reply = match timeout(
            self.config.assistant_timeout,
            self.engine.process_brain_input(input, &snapshot),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!("Assistant call failed: {}", e);
                return self.fallback_outcome().await;
            }
            Err(_) => {
                tracing::warn!(
                    "Assistant call timed out after {}s",
                    self.config.assistant_timeout.as_secs()
                );
                return self.fallback_outcome().await;
            }
        };

        let mut report = None;
        let mut defects = Vec::new();
        if let Some(changes) = reply.suggested_changes {
            let (proposal, wire_defects) = ChangeProposal::from_wire(changes);
            defects = wire_defects;
            report = Some(self.reconciler.apply(proposal).await);
        }

        self.push_turn(ChatRole::Assistant, reply.reply.clone())
            .await;

        ChatOutcome::Replied {
            reply: reply.reply,
            report,
            defects,
        }
    }

    async fn fallback_outcome(&self) -> ChatOutcome {
        self.push_turn(ChatRole::Assistant, FALLBACK_REPLY.to_string())
            .await;
        ChatOutcome::Replied {
            reply: FALLBACK_REPLY.to_string(),
            report: None,
            defects: Vec::new(),
        }
    }

    async fn push_turn(&self, role: ChatRole, text: String) {
        let mut transcript = self.transcript.write().await;
        transcript.push(ChatTurn::new(role, text));
        if transcript.len() > self.config.transcript_limit {
            let excess = transcript.len() - self.config.transcript_limit;
            transcript.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mindgraph_assistant_engine::{
        AssistantReply, ExtractedTask, MapSnapshot, Result as AssistantResult, ScriptedAssistant,
    };
    use tokio::sync::Notify;
    use tokio::time::sleep;

    /// Engine that holds the brain call open until released
    struct GatedEngine {
        release: Notify,
    }

    #[async_trait]
    impl AssistantEngine for GatedEngine {
        async fn process_brain_input(
            &self,
            input: &str,
            _map: &MapSnapshot,
        ) -> AssistantResult<AssistantReply> {
            self.release.notified().await;
            Ok(AssistantReply::text_only(format!("Echo: {}", input)))
        }

        async fn extract_tasks(&self, _map: &MapSnapshot) -> AssistantResult<Vec<ExtractedTask>> {
            Ok(Vec::new())
        }
    }

    /// Engine whose brain call never returns
    struct StalledEngine;

    #[async_trait]
    impl AssistantEngine for StalledEngine {
        async fn process_brain_input(
            &self,
            _input: &str,
            _map: &MapSnapshot,
        ) -> AssistantResult<AssistantReply> {
            std::future::pending().await
        }

        async fn extract_tasks(&self, _map: &MapSnapshot) -> AssistantResult<Vec<ExtractedTask>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_turn_applies_suggested_changes() {
        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(ScriptedAssistant::new());
        engine
            .push_reply(
                r#"{"reply": "Added a gym branch.",
                    "suggestedChanges": {
                      "nodesToAdd": [{"id": "gym", "label": "Gym", "kind": "concept"}],
                      "edgesToAdd": [{"id": "e3", "source": "health", "target": "gym"}]
                    }}"#
                .to_string(),
            )
            .await;

        let session = ChatSession::new(Arc::clone(&store), engine);
        let outcome = session.process_input("I want to start lifting").await;

        match outcome {
            ChatOutcome::Replied {
                reply,
                report,
                defects,
            } => {
                assert_eq!(reply, "Added a gym branch.");
                let report = report.expect("changes were proposed");
                assert_eq!(report.nodes_added, 1);
                assert_eq!(report.edges_added, 1);
                assert!(defects.is_empty());
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }

        assert!(store.contains_node("gym").await);
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_text_only_reply_skips_reconciler() {
        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(ScriptedAssistant::new());
        engine.push_reply("Just a thought.".to_string()).await;

        let session = ChatSession::new(Arc::clone(&store), engine);
        let outcome = session.process_input("hello").await;

        match outcome {
            ChatOutcome::Replied { reply, report, .. } => {
                assert_eq!(reply, "Just a thought.");
                assert!(report.is_none());
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }
        assert_eq!(store.node_count().await, 3);
    }

    #[tokio::test]
    async fn test_defects_are_surfaced_and_rest_applies() {
        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(ScriptedAssistant::new());
        engine
            .push_reply(
                r#"{"reply": "Done.",
                    "suggestedChanges": {
                      "nodesToAdd": [
                        {"label": "No Id"},
                        {"id": "gym", "label": "Gym"}
                      ],
                      "edgesToAdd": [{"id": "e3", "source": "health", "target": "gym"}]
                    }}"#
                .to_string(),
            )
            .await;

        let session = ChatSession::new(Arc::clone(&store), engine);
        let outcome = session.process_input("add stuff").await;

        match outcome {
            ChatOutcome::Replied {
                report, defects, ..
            } => {
                assert_eq!(defects.len(), 1);
                let report = report.expect("changes were proposed");
                assert_eq!(report.nodes_added, 1);
                assert_eq!(report.edges_added, 1);
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }
        assert!(store.contains_node("gym").await);
    }

    #[tokio::test]
    async fn test_engine_failure_yields_fallback_and_untouched_store() {
        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(ScriptedAssistant::new());
        engine
            .push_reply_failure("model unavailable".to_string())
            .await;

        let session = ChatSession::new(Arc::clone(&store), engine);
        let outcome = session.process_input("add a gym").await;

        match outcome {
            ChatOutcome::Replied { reply, report, .. } => {
                assert_eq!(reply, FALLBACK_REPLY);
                assert!(report.is_none());
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }

        assert_eq!(store.node_count().await, 3);
        assert_eq!(store.edge_count().await, 2);

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_timeout_yields_fallback() {
        let store = Arc::new(GraphStore::seeded());
        let config = ChatConfig {
            assistant_timeout: Duration::from_millis(50),
            ..ChatConfig::default()
        };
        let session = ChatSession::with_config(Arc::clone(&store), Arc::new(StalledEngine), config);

        let outcome = session.process_input("anyone there?").await;

        match outcome {
            ChatOutcome::Replied { reply, report, .. } => {
                assert_eq!(reply, FALLBACK_REPLY);
                assert!(report.is_none());
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }
        assert!(!session.is_processing());
        assert_eq!(store.node_count().await, 3);
    }

    #[tokio::test]
    async fn test_busy_gate_rejects_concurrent_input() {
        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(GatedEngine {
            release: Notify::new(),
        });
        let session = Arc::new(ChatSession::new(
            store,
            Arc::clone(&engine) as Arc<dyn AssistantEngine>,
        ));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.process_input("first").await }
        });

        // Wait for the first turn to reach the gated engine call
        let mut waited = Duration::ZERO;
        while !session.is_processing() && waited < Duration::from_secs(1) {
            sleep(Duration::from_millis(5)).await;
            waited += Duration::from_millis(5);
        }
        assert!(session.is_processing());

        let second = session.process_input("second").await;
        assert!(matches!(second, ChatOutcome::Busy));

        engine.release.notify_one();
        let first = first.await.unwrap();
        match first {
            ChatOutcome::Replied { reply, .. } => assert_eq!(reply, "Echo: first"),
            ChatOutcome::Busy => panic!("first turn should complete"),
        }
        assert!(!session.is_processing());

        // The rejected input never reached the transcript
        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "first");
    }

    #[tokio::test]
    async fn test_transcript_is_bounded() {
        let store = Arc::new(GraphStore::seeded());
        let config = ChatConfig {
            transcript_limit: 4,
            ..ChatConfig::default()
        };
        // Exhausted script: every turn echoes with "Noted: ..."
        let session =
            ChatSession::with_config(store, Arc::new(ScriptedAssistant::new()), config);

        session.process_input("first").await;
        session.process_input("second").await;
        session.process_input("third").await;

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[0].text, "second");
        assert_eq!(transcript[3].text, "Noted: third");
    }

    #[tokio::test]
    async fn test_replaying_same_reply_is_idempotent() {
        let changes = r#"{"reply": "Added.",
            "suggestedChanges": {
              "nodesToAdd": [{"id": "gym", "label": "Gym"}],
              "edgesToAdd": [{"id": "e3", "source": "health", "target": "gym"}]
            }}"#;

        let store = Arc::new(GraphStore::seeded());
        let engine = Arc::new(ScriptedAssistant::new());
        engine.push_reply(changes.to_string()).await;
        engine.push_reply(changes.to_string()).await;

        let session = ChatSession::new(Arc::clone(&store), engine);
        session.process_input("add a gym").await;
        let second = session.process_input("add a gym").await;

        match second {
            ChatOutcome::Replied { report, .. } => {
                assert!(report.expect("changes were proposed").is_noop());
            }
            ChatOutcome::Busy => panic!("session should not be busy"),
        }
        assert_eq!(store.node_count().await, 4);
        assert_eq!(store.edge_count().await, 3);
    }
}
