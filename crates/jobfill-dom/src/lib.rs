//! In-memory host document for the jobfill engine.
//!
//! [`MemoryDocument`] implements the [`jobfill_protocols::Document`] surface
//! over an arena tree. It models what the engine has to cope with on real
//! pages:
//!
//! - same-origin and cross-origin frames
//! - computed visibility (`hidden`, `display:none`, `visibility:hidden`)
//! - bubbling event listeners bound on ancestors
//! - framework-controlled inputs that drop programmatic writes
//! - detached nodes and full page replacement
//!
//! Pages are described with [`PageSnapshot`], either built in code or loaded
//! from JSON.

mod document;
mod error;
mod snapshot;

pub use document::{DeliveredEvent, MemoryDocument};
pub use error::SnapshotError;
pub use snapshot::{el, ElementSpec, FrameSpec, NodeSpec, PageSnapshot};

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
