//! Persistence layer: the definition store (groups and fields), the
//! polymorphic value store, and the append-only submission store. Stores
//! hold typed rows in ordered maps; cross-store invariants (cascades,
//! key resolution, capability checks) live in [`crate::engine`].

mod definition;
mod entity_ref;
mod submission;
mod value;

pub use definition::*;
pub use entity_ref::*;
pub use submission::*;
pub use value::*;
