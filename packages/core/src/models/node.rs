//! Node Data Structures
//!
//! This module defines the core `Node` struct and related types for
//! MindGraph's mind-map model.
//!
//! # Architecture
//!
//! - **Five kinds**: concept, task, person, event, resource
//! - **Task facet**: date, reminder, completion, and priority fields are
//!   optional on every node; the task projection reads them regardless of kind
//! - **Layout position**: owned by the renderer, mutated through the store's
//!   position path, never by patches
//!
//! # Examples
//!
//! ```rust
//! use mindgraph_core::models::{Node, NodeKind, Priority};
//!
//! let gym = Node::new("Gym".to_string(), NodeKind::Task)
//!     .with_description("Strength training three times a week".to_string())
//!     .with_priority(Priority::High);
//!
//! assert_eq!(gym.kind, NodeKind::Task);
//! assert!(gym.validate().is_ok());
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for Node and Edge operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// The five node kinds of the mind map
///
/// Serialized as lowercase strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Free-form idea or topic (default)
    Concept,
    /// Actionable item picked up by the task projection
    Task,
    /// A person in the user's life
    Person,
    /// Something happening at a point in time
    Event,
    /// Link, document, or other external material
    Resource,
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Concept
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Model output occasionally capitalizes kind names
        match s.to_ascii_lowercase().as_str() {
            "concept" => Ok(Self::Concept),
            "task" => Ok(Self::Task),
            "person" => Ok(Self::Person),
            "event" => Ok(Self::Event),
            "resource" => Ok(Self::Resource),
            _ => Err(format!("Invalid node kind: {}", s)),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concept => write!(f, "concept"),
            Self::Task => write!(f, "task"),
            Self::Person => write!(f, "person"),
            Self::Event => write!(f, "event"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

/// Priority of a task-like node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Layout position of a node on the canvas
///
/// Written by the renderer through the store's position path; patches never
/// touch it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A node of the mind map.
///
/// # Fields
///
/// - `id`: Unique identifier, stable for the node's lifetime (UUID unless the
///   creator supplied one)
/// - `label`: Display name shown on the canvas
/// - `kind`: One of the five node kinds
/// - `description`: Longer free-form text, may be empty
/// - `icon`: Optional emoji or glyph name
/// - `date`: Optional calendar date (due date for task-like nodes)
/// - `reminder_date`: Optional local date-time for a reminder
/// - `is_completed`: Optional completion flag
/// - `priority`: Optional priority
/// - `position`: Canvas position, owned by the layout
/// - `created_at` / `modified_at`: Bookkeeping timestamps
///
/// # Examples
///
/// ```rust
/// # use mindgraph_core::models::{Node, NodeKind};
/// # use chrono::NaiveDate;
/// let dentist = Node::new("Dentist appointment".to_string(), NodeKind::Event)
///     .with_date(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap());
///
/// assert_eq!(dentist.kind, NodeKind::Event);
/// assert!(dentist.date.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (UUID or caller-chosen stable id)
    pub id: String,

    /// Display name
    pub label: String,

    /// Node kind, defaults to concept
    #[serde(default)]
    pub kind: NodeKind,

    /// Longer free-form text
    #[serde(default)]
    pub description: String,

    /// Optional emoji or glyph name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Optional calendar date (due date for task-like nodes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Optional local reminder date-time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<NaiveDateTime>,

    /// Optional completion flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,

    /// Optional priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Canvas position, mutated by the layout
    #[serde(default)]
    pub position: Position,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Node {
    /// Create a new Node with auto-generated UUID
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mindgraph_core::models::{Node, NodeKind};
    /// let node = Node::new("Health".to_string(), NodeKind::Concept);
    /// assert!(!node.id.is_empty());
    /// assert_eq!(node.label, "Health");
    /// ```
    pub fn new(label: String, kind: NodeKind) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), label, kind)
    }

    /// Create a new Node with a caller-chosen id
    ///
    /// Used for seed nodes and for ids proposed by the assistant, which stay
    /// stable so later turns can reference them.
    pub fn new_with_id(id: String, label: String, kind: NodeKind) -> Self {
        let now = Utc::now();

        Self {
            id,
            label,
            kind,
            description: String::new(),
            icon: None,
            date: None,
            reminder_date: None,
            is_completed: None,
            priority: None,
            position: Position::default(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// Set the icon
    pub fn with_icon(mut self, icon: String) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set the calendar date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the reminder date-time
    pub fn with_reminder_date(mut self, reminder_date: NaiveDateTime) -> Self {
        self.reminder_date = Some(reminder_date);
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the canvas position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Validate node structure and required fields
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - `label` is empty
    /// - `position` contains a non-finite coordinate
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.label.is_empty() {
            return Err(ValidationError::MissingField("label".to_string()));
        }

        if !self.position.is_finite() {
            return Err(ValidationError::InvalidPosition(format!(
                "({}, {})",
                self.position.x, self.position.y
            )));
        }

        Ok(())
    }

    /// Shallow-merge a patch into this node
    ///
    /// Fields absent from the patch are preserved. Nullable fields follow the
    /// double-Option pattern: `Some(None)` clears, `Some(Some(v))` sets.
    /// Position is not patchable.
    pub fn apply_patch(&mut self, patch: &NodePatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = icon.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(reminder_date) = patch.reminder_date {
            self.reminder_date = reminder_date;
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.modified_at = Utc::now();
    }

    /// Update the canvas position
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

/// Custom deserializer for optional fields that accepts both plain values and null
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (clear the field)
/// - value → Some(Some(value)) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Accept either T or null from JSON
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update structure for merge operations
///
/// Only provided fields change the target node; the id names the target and
/// is never itself updated. Nullable fields distinguish "leave alone" from
/// "clear" via the double-Option pattern.
///
/// # Examples
///
/// ```rust
/// use mindgraph_core::models::{NodePatch, Priority};
///
/// let patch = NodePatch::new("gym".to_string())
///     .with_label("Gym sessions".to_string())
///     .with_priority(Priority::High);
///
/// assert_eq!(patch.id, "gym");
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    /// Target node id
    pub id: String,

    /// Update display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Update node kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    /// Update description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Update or clear the icon
    ///
    /// - `None`: don't change icon
    /// - `Some(None)`: clear icon
    /// - `Some(Some(icon))`: set icon
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub icon: Option<Option<String>>,

    /// Update or clear the calendar date
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub date: Option<Option<NaiveDate>>,

    /// Update or clear the reminder date-time
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub reminder_date: Option<Option<NaiveDateTime>>,

    /// Update or clear the completion flag
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub is_completed: Option<Option<bool>>,

    /// Update or clear the priority
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub priority: Option<Option<Priority>>,
}

impl NodePatch {
    /// Create an empty patch targeting `id`
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Set the display name
    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear the calendar date
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = Some(date);
        self
    }

    /// Set or clear the reminder date-time
    pub fn with_reminder_date(mut self, reminder_date: Option<NaiveDateTime>) -> Self {
        self.reminder_date = Some(reminder_date);
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(Some(is_completed));
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(Some(priority));
        self
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.kind.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.date.is_none()
            && self.reminder_date.is_none()
            && self.is_completed.is_none()
            && self.priority.is_none()
    }
}
