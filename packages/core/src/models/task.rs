//! Task Data Structures
//!
//! A `Task` is a derived, editable view onto exactly one graph node. The
//! projection recomputes the whole list on sync; task edits are written back
//! onto the originating node through the field mapping documented on
//! [`Task`].

use crate::models::node::{Node, NodePatch, Priority};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the task projection
///
/// # Field mapping
///
/// Writing a task back onto its node maps:
///
/// - `title` → `label`
/// - `due_date` → `date`
/// - `reminder_date` → `reminder_date`
/// - `urgency` → `priority`
/// - `completed` → `is_completed`
///
/// # Examples
///
/// ```rust
/// use mindgraph_core::models::{Priority, Task};
///
/// let task = Task::new("Go to the gym".to_string(), "gym".to_string());
/// assert_eq!(task.urgency, Priority::Medium);
/// assert!(!task.completed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier of the task entry itself
    pub id: String,

    /// Display title, written back as the node label
    pub title: String,

    /// Optional due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Optional reminder date-time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<NaiveDateTime>,

    /// Urgency, defaults to medium
    #[serde(default)]
    pub urgency: Priority,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Id of the graph node this task was derived from
    pub node_id: String,
}

impl Task {
    /// Create a new Task with auto-generated UUID
    pub fn new(title: String, node_id: String) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), title, node_id)
    }

    /// Create a new Task with a caller-chosen id
    pub fn new_with_id(id: String, title: String, node_id: String) -> Self {
        Self {
            id,
            title,
            due_date: None,
            reminder_date: None,
            urgency: Priority::default(),
            completed: false,
            node_id,
        }
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the reminder date-time
    pub fn with_reminder_date(mut self, reminder_date: NaiveDateTime) -> Self {
        self.reminder_date = Some(reminder_date);
        self
    }

    /// Set the urgency
    pub fn with_urgency(mut self, urgency: Priority) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Build the node patch that writes this task's fields back onto its node
    ///
    /// Absent dates clear the node's corresponding fields; everything else is
    /// always set. The node's other fields are untouched by the merge.
    pub fn to_node_patch(&self) -> NodePatch {
        NodePatch::new(self.node_id.clone())
            .with_label(self.title.clone())
            .with_date(self.due_date)
            .with_reminder_date(self.reminder_date)
            .with_priority(self.urgency)
            .with_completed(self.completed)
    }

    /// Derive the task view of a node, reusing an existing task id
    ///
    /// Used by the write-back path to reflect an edit locally without waiting
    /// for the next resync.
    pub fn from_node(id: String, node: &Node) -> Self {
        Self {
            id,
            title: node.label.clone(),
            due_date: node.date,
            reminder_date: node.reminder_date,
            urgency: node.priority.unwrap_or_default(),
            completed: node.is_completed.unwrap_or(false),
            node_id: node.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::NodeKind;

    #[test]
    fn test_task_creation() {
        let task = Task::new("Go to the gym".to_string(), "gym".to_string());

        assert!(!task.id.is_empty());
        assert_eq!(task.title, "Go to the gym");
        assert_eq!(task.node_id, "gym");
        assert_eq!(task.urgency, Priority::Medium);
        assert!(!task.completed);
    }

    #[test]
    fn test_write_back_patch_mapping() {
        let due = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let task = Task::new_with_id("t1".to_string(), "Gym".to_string(), "gym".to_string())
            .with_due_date(due)
            .with_urgency(Priority::High)
            .with_completed(true);

        let patch = task.to_node_patch();

        assert_eq!(patch.id, "gym");
        assert_eq!(patch.label.as_deref(), Some("Gym"));
        assert_eq!(patch.date, Some(Some(due)));
        assert_eq!(patch.priority, Some(Some(Priority::High)));
        assert_eq!(patch.is_completed, Some(Some(true)));
        // No due date on the task would clear the node's date
        let undated = Task::new("Gym".to_string(), "gym".to_string());
        assert_eq!(undated.to_node_patch().date, Some(None));
    }

    #[test]
    fn test_round_trip_through_node() {
        let due = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let task = Task::new_with_id("t1".to_string(), "Lift".to_string(), "gym".to_string())
            .with_due_date(due)
            .with_urgency(Priority::High)
            .with_completed(true);

        let mut node = Node::new_with_id("gym".to_string(), "Gym".to_string(), NodeKind::Task);
        node.apply_patch(&task.to_node_patch());

        assert_eq!(node.label, "Lift");
        assert_eq!(node.date, Some(due));
        assert_eq!(node.priority, Some(Priority::High));
        assert_eq!(node.is_completed, Some(true));

        let derived = Task::from_node("t1".to_string(), &node);
        assert_eq!(derived, task);
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let task = Task::new_with_id("t1".to_string(), "Gym".to_string(), "gym".to_string())
            .with_due_date(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["nodeId"], "gym");
        assert_eq!(value["dueDate"], "2026-09-01");
        assert!(value.get("node_id").is_none());
    }
}
