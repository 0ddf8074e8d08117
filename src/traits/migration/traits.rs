//! The migration hook contract.

use std::any::Any;
use std::fmt;

use strum::{Display, IntoStaticStr};

use super::{MigrationContext, SchemaVersion, SerializerSelection};
use crate::decoder::TypeDescriptor;
use crate::errors::NetabaseResult;
use crate::traits::registery::MemberDescriptor;

/// The family a hook belongs to, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum HookKind {
    /// Never migrates anything.
    Noop,
    /// Rule-based migration keyed on schema versions.
    VersionedMigration,
    /// Any other policy.
    Custom,
}

/// Policy deciding how documents written by other schema versions are
/// reconstructed.
///
/// The decoder consults the hook once per element through
/// [`select_decoder`](MigrationHook::select_decoder), and once per object
/// through [`dispose_extra_elements`](MigrationHook::dispose_extra_elements)
/// when the document contained elements with no member on the target type.
///
/// Hooks are shared by every concurrent decode, so implementations must not
/// mutate shared state from `select_decoder` or `can_recover`.
///
/// # Example
///
/// A hook that renames one element and otherwise defers to the defaults:
///
/// ```
/// use std::any::Any;
/// use netabase_migrate::prelude::*;
///
/// #[derive(Debug)]
/// struct RenameHook {
///     rename: Assignment,
/// }
///
/// impl MigrationHook for RenameHook {
///     fn can_recover(&self, _target: TypeDescriptor, version: SchemaVersion) -> bool {
///         version == SchemaVersion::Explicit(1)
///     }
///
///     fn create_context(&self, target: TypeDescriptor) -> MigrationContext {
///         MigrationContext::new(target)
///     }
///
///     fn select_decoder(
///         &self,
///         descriptor: &MemberDescriptor<'_>,
///         target: TypeDescriptor,
///         version: SchemaVersion,
///     ) -> NetabaseResult<SerializerSelection> {
///         if self.can_recover(target, version) && descriptor.element_name() == "nm" {
///             return Ok(SerializerSelection::new(
///                 Some(ValueDecoder::<String>::shared()),
///                 Some(self.rename.clone()),
///                 None,
///             ));
///         }
///         Ok(SerializerSelection::empty())
///     }
///
///     fn dispose_extra_elements(
///         &self,
///         _object: &mut dyn Any,
///         _context: MigrationContext,
///         _version: i32,
///     ) -> NetabaseResult<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait MigrationHook: Send + Sync + fmt::Debug {
    fn kind(&self) -> HookKind {
        HookKind::Custom
    }

    /// Whether this hook knows how to reconstruct `target` documents written
    /// at `version`. Must be pure.
    ///
    /// A `false` answer is advisory: the other operations may still be called
    /// for the pair, but callers should not expect them to migrate anything.
    fn can_recover(&self, target: TypeDescriptor, version: SchemaVersion) -> bool;

    /// A fresh context for one document or sub-document of type `target`.
    fn create_context(&self, target: TypeDescriptor) -> MigrationContext;

    /// Decide how the element described by `descriptor` is decoded.
    ///
    /// Returning [`SerializerSelection::empty`] defers to the decoder's default
    /// handling.
    fn select_decoder(
        &self,
        descriptor: &MemberDescriptor<'_>,
        target: TypeDescriptor,
        version: SchemaVersion,
    ) -> NetabaseResult<SerializerSelection>;

    /// Dispose of the extra elements accrued in `context` once `object` is
    /// fully constructed. Called at most once per object, and only when
    /// `context` is non-empty. `version` is 0 when the document did not
    /// specify one.
    fn dispose_extra_elements(
        &self,
        object: &mut dyn Any,
        context: MigrationContext,
        version: i32,
    ) -> NetabaseResult<()>;
}
