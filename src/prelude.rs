//! Prelude module for convenient imports.
//!
//! ```rust
//! use netabase_migrate::prelude::*;
//! ```

pub use crate::config::DecoderConfig;
pub use crate::decoder::{
    DecodeScope, DecodedValue, DocumentDecoder, FieldDecoder, FnDecoder, ObjectDecoder,
    RawDecoder, TypeDescriptor, ValueDecoder,
};
pub use crate::errors::{NetabaseError, NetabaseResult};
pub use crate::hooks::{
    DefaultHook, ExtraMembers, FieldRule, HookRegistry, TypePolicy, VersionedMigrationHook,
};
pub use crate::traits::migration::{
    HookKind, MigrationContext, MigrationHook, SchemaVersion, SerializerSelection,
};
pub use crate::traits::registery::{
    Assignment, ClassMap, ClassMapRegistry, ExtraElementsSlot, MemberDescriptor, MemberMap,
};
