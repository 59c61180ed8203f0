/// Scripted assistant for tests and offline runs
use crate::engine::AssistantEngine;
use crate::error::{AssistantError, Result};
use crate::parse::{parse_reply, parse_task_list};
use crate::types::{AssistantReply, ExtractedTask, MapSnapshot};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One queued scripted outcome
#[derive(Debug, Clone)]
enum ScriptedTurn {
    /// Raw model output, routed through the real parser
    Raw(String),
    /// Simulated transport or provider failure
    Failure(String),
}

/// An [`AssistantEngine`] that replays queued raw responses
///
/// Queued strings pass through the same parsing as live model output, so
/// scripted runs exercise the full fenced-JSON and plain-text fallback
/// behavior. An exhausted reply queue echoes an acknowledgment; an exhausted
/// task queue yields an empty list.
#[derive(Debug, Default)]
pub struct ScriptedAssistant {
    replies: Mutex<VecDeque<ScriptedTurn>>,
    task_lists: Mutex<VecDeque<ScriptedTurn>>,
    brain_calls: AtomicUsize,
    extraction_calls: AtomicUsize,
}

impl ScriptedAssistant {
    /// Create a scripted assistant with empty queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw output for the next chat turn
    pub async fn push_reply(&self, raw: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedTurn::Raw(raw.into()));
    }

    /// Queue a failure for the next chat turn
    pub async fn push_reply_failure(&self, reason: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedTurn::Failure(reason.into()));
    }

    /// Queue raw output for the next task extraction
    pub async fn push_task_list(&self, raw: impl Into<String>) {
        self.task_lists
            .lock()
            .await
            .push_back(ScriptedTurn::Raw(raw.into()));
    }

    /// Queue a failure for the next task extraction
    pub async fn push_task_list_failure(&self, reason: impl Into<String>) {
        self.task_lists
            .lock()
            .await
            .push_back(ScriptedTurn::Failure(reason.into()));
    }

    /// Number of chat turns processed so far
    pub fn brain_call_count(&self) -> usize {
        self.brain_calls.load(Ordering::SeqCst)
    }

    /// Number of task extractions processed so far
    pub fn extraction_call_count(&self) -> usize {
        self.extraction_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantEngine for ScriptedAssistant {
    async fn process_brain_input(
        &self,
        input: &str,
        _map: &MapSnapshot,
    ) -> Result<AssistantReply> {
        self.brain_calls.fetch_add(1, Ordering::SeqCst);

        match self.replies.lock().await.pop_front() {
            Some(ScriptedTurn::Raw(raw)) => Ok(parse_reply(&raw)),
            Some(ScriptedTurn::Failure(reason)) => Err(AssistantError::call_failed(reason)),
            None => Ok(AssistantReply::text_only(format!("Noted: {}", input))),
        }
    }

    async fn extract_tasks(&self, _map: &MapSnapshot) -> Result<Vec<ExtractedTask>> {
        self.extraction_calls.fetch_add(1, Ordering::SeqCst);

        match self.task_lists.lock().await.pop_front() {
            Some(ScriptedTurn::Raw(raw)) => Ok(parse_task_list(&raw)),
            Some(ScriptedTurn::Failure(reason)) => Err(AssistantError::call_failed(reason)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_pass_through_parser() {
        let assistant = ScriptedAssistant::new();
        assistant
            .push_reply("```json\n{\"reply\": \"Added.\", \"suggestedChanges\": {\"nodesToAdd\": [{\"id\": \"gym\"}]}}\n```")
            .await;
        assistant.push_reply("just some prose").await;

        let map = MapSnapshot::new();

        let first = assistant.process_brain_input("add gym", &map).await.unwrap();
        assert_eq!(first.reply, "Added.");
        assert_eq!(first.suggested_changes.unwrap().nodes_to_add.len(), 1);

        let second = assistant.process_brain_input("anything", &map).await.unwrap();
        assert_eq!(second.reply, "just some prose");
        assert!(second.suggested_changes.is_none());

        assert_eq!(assistant.brain_call_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_queue_echoes() {
        let assistant = ScriptedAssistant::new();
        let map = MapSnapshot::new();

        let reply = assistant.process_brain_input("hello", &map).await.unwrap();
        assert_eq!(reply.reply, "Noted: hello");
        assert!(reply.suggested_changes.is_none());
    }

    #[tokio::test]
    async fn test_scripted_failure_surfaces_as_error() {
        let assistant = ScriptedAssistant::new();
        assistant.push_reply_failure("provider unavailable").await;

        let map = MapSnapshot::new();
        let err = assistant
            .process_brain_input("hello", &map)
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::CallFailed(_)));
    }

    #[test]
    fn test_task_extraction_with_block_on() {
        // tokio_test covers the no-runtime call path
        let assistant = ScriptedAssistant::new();
        let map = MapSnapshot::new();

        tokio_test::block_on(async {
            assistant
                .push_task_list(r#"[{"title": "Stretch", "nodeId": "gym"}]"#)
                .await;

            let tasks = assistant.extract_tasks(&map).await.unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].title.as_deref(), Some("Stretch"));

            // Queue exhausted: empty replacement list, not an error
            let empty = assistant.extract_tasks(&map).await.unwrap();
            assert!(empty.is_empty());
        });

        assert_eq!(assistant.extraction_call_count(), 2);
    }
}
