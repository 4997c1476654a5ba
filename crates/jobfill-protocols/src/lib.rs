//! # jobfill Protocols
//!
//! Shared data model and trait seams for the jobfill autofill engine.
//! Contains only types and interface definitions - the engine lives in
//! `jobfill-engine`, host documents and stores live in their own crates.
//!
//! ## Core Traits
//!
//! - [`Document`] - Read/write surface of a live host page
//! - [`KeyValueStore`] - Backing store for credentials
//! - [`ProfileProvider`] - Supplies the applicant profile snapshot
//! - [`InferenceStrategy`] - Optional remote field classification

pub mod credentials;
pub mod document;
pub mod error;
pub mod field;
pub mod inference;
pub mod navigation;
pub mod profile;

pub use credentials::{
    Credentials, CredentialsPatch, KeyValueStore, API_KEY_STORE_KEY, AUTH_TOKEN_STORE_KEY,
};
pub use document::{
    Document, ElementRef, ElementSnapshot, EventKind, NodeSnapshot, PageId, PageInstance,
    SelectOption, SyntheticEvent,
};
pub use error::{DomError, InferenceError, StoreError};
pub use field::{
    Confidence, CurrentValue, FieldDescriptor, FillOutcome, FillPlan, FillStatus, InputKind,
    MatchResult, SemanticType,
};
pub use inference::{FieldClassification, InferenceStrategy};
pub use navigation::NavigationState;
pub use profile::{Profile, ProfileProvider, ProfileValue, Scalar, StaticProfile};
