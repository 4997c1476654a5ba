//! OpenAI field classification for jobfill.
//!
//! Implements [`InferenceStrategy`](jobfill_protocols::InferenceStrategy)
//! over the chat-completions API: a field label goes out, a
//! `{"type", "confidence"}` answer comes back.

mod api;
mod classifier;

pub use classifier::{OpenAiClassifier, FIELD_TYPES};
