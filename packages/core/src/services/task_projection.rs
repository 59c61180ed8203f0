//! Task Projection
//!
//! Derives a flat, editable task list from the graph via assistant
//! extraction, and writes task edits back onto the originating nodes.
//!
//! # Architecture
//!
//! The graph is the source of truth; the task list is a projection that is
//! wholesale replaced on every successful sync. Between syncs the two copies
//! may drift. A task edit goes through [`GraphStore::update_node`] and is
//! immediately reflected in the local list, so the rule is: last sync wins,
//! edits apply instantly.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mindgraph_assistant_engine::{AssistantEngine, ExtractedTask};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::graph::{DomainEvent, GraphStore};
use crate::models::{Priority, Task};
use crate::services::error::ProjectionError;

/// Assistant-backed task list over a [`GraphStore`]
pub struct TaskProjection {
    store: Arc<GraphStore>,
    engine: Arc<dyn AssistantEngine>,
    tasks: RwLock<Vec<Task>>,
}

impl TaskProjection {
    pub fn new(store: Arc<GraphStore>, engine: Arc<dyn AssistantEngine>) -> Self {
        Self {
            store,
            engine,
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Current task list
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Number of tasks currently projected
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Re-extract tasks from the current graph and replace the list.
    ///
    /// On success the previous list is discarded entirely and
    /// [`DomainEvent::TasksResynced`] is emitted. On failure the previous
    /// list stays untouched; callers see a stale list, never a broken one.
    /// Returns the size of the new list.
    pub async fn sync(&self) -> Result<usize, ProjectionError> {
        let snapshot = self.store.snapshot().await;
        let extracted = self
            .engine
            .extract_tasks(&snapshot)
            .await
            .map_err(|e| ProjectionError::extraction_failed(e.to_string()))?;

        let known_ids = self.store.node_ids().await;
        let mut replacement = Vec::with_capacity(extracted.len());
        for wire in extracted {
            if let Some(task) = convert_extracted(wire, &known_ids) {
                replacement.push(task);
            }
        }

        let count = replacement.len();
        *self.tasks.write().await = replacement;
        self.store.emit_event(DomainEvent::TasksResynced { count });
        tracing::info!("Task list resynced: {} tasks", count);
        Ok(count)
    }

    /// Write a task edit back onto its node.
    ///
    /// Fails if the task's node is no longer in the graph. On success the
    /// edited task is upserted into the local list under its task id, so the
    /// caller sees the edit without waiting for the next resync. Returns the
    /// task as re-derived from the updated node.
    pub async fn apply_task_edit(&self, task: Task) -> Result<Task, ProjectionError> {
        let patch = task.to_node_patch();
        let node = self
            .store
            .update_node(&patch)
            .await
            .ok_or_else(|| ProjectionError::unknown_node(&task.node_id))?;

        let reflected = Task::from_node(task.id.clone(), &node);
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = reflected.clone(),
            None => tasks.push(reflected.clone()),
        }
        Ok(reflected)
    }
}

/// Convert one extracted entry into a task, or drop it.
///
/// Entries without a usable title or node id, and entries whose node id does
/// not resolve in the current graph, are dropped with a warning. Missing ids
/// get a generated UUID; unparseable dates and urgencies fall back to absent
/// and medium.
fn convert_extracted(wire: ExtractedTask, known_ids: &HashSet<String>) -> Option<Task> {
    let title = match wire.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            tracing::warn!("Dropping extracted task without a title");
            return None;
        }
    };

    let node_id = match wire.node_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            tracing::warn!("Dropping extracted task '{}' without a node id", title);
            return None;
        }
    };
    if !known_ids.contains(&node_id) {
        tracing::warn!(
            "Dropping extracted task '{}' for unknown node {}",
            title,
            node_id
        );
        return None;
    }

    let id = match wire.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let mut task = Task::new_with_id(id, title, node_id);

    if let Some(raw) = wire.due_date.as_deref() {
        match parse_wire_date(raw) {
            Some(date) => task.due_date = Some(date),
            None => tracing::warn!("Task '{}': unparseable due date '{}'", task.title, raw),
        }
    }
    if let Some(raw) = wire.reminder_date.as_deref() {
        match parse_wire_datetime(raw) {
            Some(reminder) => task.reminder_date = Some(reminder),
            None => tracing::warn!("Task '{}': unparseable reminder '{}'", task.title, raw),
        }
    }
    if let Some(raw) = wire.urgency.as_deref() {
        match raw.parse::<Priority>() {
            Ok(urgency) => task.urgency = urgency,
            Err(e) => tracing::warn!("Task '{}': {}", task.title, e),
        }
    }
    task.completed = wire.completed.unwrap_or(false);

    Some(task)
}

fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_wire_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
}
