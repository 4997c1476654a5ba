//! JSON file credential store for jobfill.
//!
//! Keeps the engine's key-value pairs in a single JSON object on disk,
//! by default at `~/.jobfill/credentials.json`:
//!
//! ```json
//! {
//!   "authToken": "tok_...",
//!   "openaiApiKey": "sk-..."
//! }
//! ```
//!
//! The file is read once when the store is opened and rewritten in full on
//! every `set`.

mod error;
mod store;

pub use error::FileStoreError;
pub use store::FileStore;
