//! # jobfill Engine
//!
//! Autofill orchestration over a host [`Document`](jobfill_protocols::Document):
//!
//! - [`FieldScanner`] discovers form controls and infers their labels
//! - [`FieldMatcher`] maps them to profile keys (exact, fuzzy, inferred)
//! - [`Filler`] writes values and verifies they stuck
//! - [`Navigator`] advances multi-step flows at most once per page
//! - [`AutofillEngine`] runs one pass of all of the above
//!
//! Supporting pieces: [`CredentialStore`] for the cached auth token and API
//! key, [`EventEmitter`] for framework-visible input events, and the
//! [`CapabilityRegistry`] through which the emitter is shared.

pub mod capability;
pub mod credentials;
mod dom_walk;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod filler;
pub mod matcher;
pub mod memory_store;
pub mod navigator;
mod radio_group;
pub mod scanner;

pub use capability::{Capability, CapabilityRegistry};
pub use credentials::CredentialStore;
pub use emitter::{Delivery, EventEmitter, InputSignal, DISPATCH_INPUT_EVENTS};
pub use engine::{AutofillEngine, PassReport, PassResult};
pub use error::CapabilityError;
pub use filler::Filler;
pub use matcher::FieldMatcher;
pub use memory_store::MemoryStore;
pub use navigator::{NavigationOutcome, Navigator, NavigatorState};
pub use scanner::FieldScanner;
