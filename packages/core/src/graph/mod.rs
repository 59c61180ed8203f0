//! Graph State
//!
//! The canonical mind-map state for one session: the store itself, the
//! domain events it broadcasts, and the starter map every session opens on.

mod events;
mod seed;
mod store;

pub use events::DomainEvent;
pub use seed::starter_map;
pub use store::GraphStore;
