//! Business Services
//!
//! This module contains the core orchestration services:
//!
//! - `Reconciler` - Applies validated change proposals to the graph store
//! - `TaskProjection` - Assistant-backed task list with write-back
//! - `TaskSyncProcessor` - Background task driving startup, scheduled, and
//!   manual resyncs
//! - `ChatSession` - Conversational turns from input to applied changes
//!
//! Services coordinate between the graph store and the assistant boundary,
//! implementing the merge, projection, and orchestration rules.

pub mod chat_session;
pub mod error;
pub mod reconciler;
pub mod sync_processor;
pub mod task_projection;

pub use chat_session::{ChatConfig, ChatOutcome, ChatRole, ChatSession, ChatTurn, FALLBACK_REPLY};
pub use error::ProjectionError;
pub use reconciler::{ApplyReport, EdgePolicy, Reconciler, SkipReason, SkippedChange};
pub use sync_processor::{SyncProcessorConfig, SyncWaker, TaskSyncProcessor};
pub use task_projection::TaskProjection;
