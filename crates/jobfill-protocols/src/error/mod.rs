//! Error types for the jobfill protocol layer.

mod dom;
mod inference;
mod store;

pub use dom::*;
pub use inference::*;
pub use store::*;
