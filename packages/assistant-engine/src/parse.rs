/// Parsing of raw assistant output into wire types
///
/// Models answer in whatever shape they feel like: bare JSON, JSON inside a
/// markdown fence, JSON buried in prose, or plain text. Parsing tries the
/// structured shapes in order and always degrades to something usable; a
/// chat turn falls back to the raw text as the reply, a task extraction
/// falls back to an empty list. Neither path ever errors.
use crate::types::{AssistantReply, ExtractedTask};
use serde::Deserialize;
use tracing::{debug, warn};

/// Parse one chat turn's raw output
///
/// Attempts, in order: the whole text as JSON, the first fenced code block,
/// the first `{`..`}` substring. If none yields a valid reply the raw text
/// becomes the conversational reply with no suggested changes.
pub fn parse_reply(raw: &str) -> AssistantReply {
    let trimmed = raw.trim();

    if let Ok(reply) = serde_json::from_str::<AssistantReply>(trimmed) {
        return reply;
    }

    if let Some(block) = extract_fenced_block(trimmed) {
        if let Ok(reply) = serde_json::from_str::<AssistantReply>(block) {
            return reply;
        }
    }

    if let Some(block) = extract_delimited(trimmed, '{', '}') {
        if let Ok(reply) = serde_json::from_str::<AssistantReply>(block) {
            return reply;
        }
    }

    debug!("assistant reply is not structured, treating as plain text");
    AssistantReply::text_only(trimmed)
}

/// Wrapper shape some models produce instead of a bare array
#[derive(Debug, Deserialize)]
struct TaskListEnvelope {
    tasks: Vec<ExtractedTask>,
}

/// Parse a task-extraction call's raw output
///
/// Accepts a bare JSON array, a fenced array, a bracketed substring, or a
/// `{"tasks": [...]}` envelope. Anything else yields an empty list; the
/// projection keeps its previous state in that case.
pub fn parse_task_list(raw: &str) -> Vec<ExtractedTask> {
    let trimmed = raw.trim();

    if let Some(tasks) = try_parse_tasks(trimmed) {
        return tasks;
    }

    if let Some(block) = extract_fenced_block(trimmed) {
        if let Some(tasks) = try_parse_tasks(block) {
            return tasks;
        }
    }

    if let Some(block) = extract_delimited(trimmed, '[', ']') {
        if let Some(tasks) = try_parse_tasks(block) {
            return tasks;
        }
    }

    warn!("task extraction output is not parseable, returning empty list");
    Vec::new()
}

fn try_parse_tasks(text: &str) -> Option<Vec<ExtractedTask>> {
    if let Ok(tasks) = serde_json::from_str::<Vec<ExtractedTask>>(text) {
        return Some(tasks);
    }
    if let Ok(envelope) = serde_json::from_str::<TaskListEnvelope>(text) {
        return Some(envelope.tasks);
    }
    None
}

/// Extract the payload of the first fenced code block
///
/// Tolerates an optional `json` language tag after the opening fence.
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let body = &text[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Extract the substring from the first `open` to the last `close`, inclusive
fn extract_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
