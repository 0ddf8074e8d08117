//! # Netabase Migrate
//!
//! Versioned schema-migration hooks for class-mapped BSON document decoding.
//!
//! Documents written by an older or newer version of an application can be
//! reconstructed into today's types without hand-written per-version
//! converters: a [`MigrationHook`](traits::migration::MigrationHook) decides,
//! element by element, which decoder and concrete type to use based on the
//! schema version stored in the document, and receives the elements the
//! target type no longer knows about.
//!
//! ## Features
//!
//! - **Per-element overrides**: retype or redirect single elements for a
//!   range of schema versions
//! - **Extra elements**: unknown elements are captured per document and can be
//!   written into an extensibility member instead of being lost
//! - **Safe by default**: with the default hook installed decoding behaves
//!   exactly as without migrations
//! - **Concurrent**: one context per document, hook snapshots per decode
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bson::{doc, Document};
//! use netabase_migrate::prelude::*;
//!
//! #[derive(Default)]
//! struct User {
//!     name: String,
//!     extras: Document,
//! }
//!
//! let class_maps = Arc::new(ClassMapRegistry::new());
//! class_maps.register(
//!     ClassMap::builder::<User>()
//!         .versioned()
//!         .field("name", "name", |u: &mut User, v: String| u.name = v)
//!         .extra_elements("extras", |u: &mut User, extras| u.extras = extras)
//!         .build()?,
//! )?;
//!
//! let hooks = Arc::new(HookRegistry::new());
//! hooks.replace(VersionedMigrationHook::new().policy(
//!     TypePolicy::for_type::<User>(1..=2)
//!         .rule(
//!             FieldRule::new("username", 1..=1)
//!                 .decode_with(ValueDecoder::<String>::shared())
//!                 .assign_to(|u: &mut User, v: String| u.name = v),
//!         )
//!         .capture_extra_elements(),
//! ));
//!
//! let decoder = ObjectDecoder::new(DecoderConfig::default(), class_maps, hooks);
//! let user: User = decoder.decode(&doc! { "_v": 1, "username": "alice", "age": 31 })?;
//!
//! assert_eq!(user.name, "alice");
//! assert_eq!(user.extras, doc! { "age": 31 });
//! # Ok::<(), NetabaseError>(())
//! ```

pub mod config;
pub mod decoder;
pub mod errors;
pub mod hooks;
pub mod prelude;
pub mod traits;
