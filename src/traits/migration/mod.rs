//! Migration hook contracts for versioned document decoding.
//!
//! This module provides the types a migration policy works with while the
//! [`ObjectDecoder`](crate::decoder::ObjectDecoder) reconstructs a document:
//!
//! - [`SchemaVersion`]: the version read from the document, threaded to every
//!   nested element.
//! - [`MigrationHook`]: the policy itself.
//! - [`SerializerSelection`]: the hook's verdict for one element.
//! - [`MigrationContext`]: per-document scratch state for extra elements.
//!
//! # Architecture
//!
//! For every element the decoder asks the active hook for a selection. An
//! empty selection means the decoder runs its own default path; anything else
//! is honoured as given, which lets a hook retype an element (for example a
//! scalar that became a sub-document) or redirect it into a different member.
//! Elements with no member on the target type are collected in the context
//! and handed back to the hook after the object is built.

mod context;
mod selection;
mod traits;
mod version;

pub use context::*;
pub use selection::*;
pub use traits::*;
pub use version::*;
