//! MindGraph Core Logic Layer
//!
//! This crate provides the graph store, change reconciliation, task
//! projection, and chat/sync orchestration for the MindGraph notebook.
//!
//! # Architecture
//!
//! - **Graph as source of truth**: nodes and edges live in an in-memory,
//!   insertion-ordered store; every other surface derives from it
//! - **Untrusted assistant boundary**: suggested changes are validated into
//!   proposals and reconciled entry by entry, never applied blindly
//! - **Derived task list**: wholesale recomputed on sync, with optimistic
//!   write-back of edits onto the originating nodes
//! - **Event-driven**: store mutations broadcast domain events; background
//!   resyncs run through one serialized loop
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Edge, Task, ChangeProposal)
//! - [`graph`] - The graph store, domain events, and the starter map
//! - [`services`] - Reconciler, task projection, sync processor, chat session
//! - [`view`] - Viewport handle and tagged host input routing

pub mod graph;
pub mod models;
pub mod services;
pub mod view;

// Re-export commonly used types
pub use graph::*;
pub use models::*;
pub use services::*;
