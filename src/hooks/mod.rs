//! Migration hook implementations and the registry holding the active one.
//!
//! - [`DefaultHook`]: never migrates, drops extra elements.
//! - [`VersionedMigrationHook`]: rule-based migration per type and version.
//! - [`HookRegistry`]: the shared slot decoders read the active hook from.

mod default;
mod registry;
mod versioned;

pub use default::*;
pub use registry::*;
pub use versioned::*;
