//! Data Models
//!
//! This module contains the core data structures used throughout MindGraph:
//!
//! - `Node` / `Edge` - the mind map itself
//! - `Task` - the derived, editable task view onto a node
//! - `ChangeProposal` - a validated batch of assistant-suggested changes
//!
//! All wire-facing types serialize camelCase. Untrusted wire input becomes
//! typed model data here, before anything touches the graph.

mod edge;
mod node;
mod proposal;
mod task;

pub use edge::Edge;
pub use node::{Node, NodeKind, NodePatch, Position, Priority, ValidationError};
pub use proposal::{ChangeProposal, ProposalDefect};
pub use task::Task;
