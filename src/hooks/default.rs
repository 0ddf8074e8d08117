//! The no-op migration hook.

use std::any::Any;
use std::sync::OnceLock;

use bson::Document;
use log::{debug, trace};

use crate::decoder::TypeDescriptor;
use crate::errors::NetabaseResult;
use crate::traits::migration::{
    HookKind, MigrationContext, MigrationHook, SchemaVersion, SerializerSelection,
};
use crate::traits::registery::{ExtraElementsSlot, MemberDescriptor};

static EXTRA_MEMBERS_SLOT: OnceLock<ExtraElementsSlot> = OnceLock::new();

/// Holder type behind the slot every [`DefaultHook`] context points at.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtraMembers {
    pub elements: Document,
}

/// Hook installed until something else is configured.
///
/// Decoding through it is indistinguishable from decoding without a hook:
/// every mapped member keeps its own decoder and assignment, and extra
/// elements are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHook;

impl DefaultHook {
    /// The slot handle shared by every context this hook creates. Registered
    /// on first use; concurrent first uses observe the same registration.
    pub fn extra_members_slot() -> &'static ExtraElementsSlot {
        EXTRA_MEMBERS_SLOT.get_or_init(|| {
            debug!("DefaultHook: Registering extra members slot");
            ExtraElementsSlot::new("elements", |holder: &mut ExtraMembers, elements| {
                holder.elements = elements
            })
        })
    }
}

impl MigrationHook for DefaultHook {
    fn kind(&self) -> HookKind {
        HookKind::Noop
    }

    fn can_recover(&self, _target: TypeDescriptor, _version: SchemaVersion) -> bool {
        false
    }

    fn create_context(&self, target: TypeDescriptor) -> MigrationContext {
        MigrationContext::with_slot(target, Self::extra_members_slot().clone())
    }

    fn select_decoder(
        &self,
        descriptor: &MemberDescriptor<'_>,
        _target: TypeDescriptor,
        _version: SchemaVersion,
    ) -> NetabaseResult<SerializerSelection> {
        Ok(SerializerSelection::passthrough(descriptor))
    }

    fn dispose_extra_elements(
        &self,
        _object: &mut dyn Any,
        context: MigrationContext,
        _version: i32,
    ) -> NetabaseResult<()> {
        trace!(
            "DefaultHook: Dropping {} extra element(s) of {}",
            context.len(),
            context.target()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::registery::MemberMap;
    use bson::Bson;

    #[derive(Default)]
    struct Invoice {
        total: f64,
    }

    #[test]
    fn test_never_recovers() {
        let hook = DefaultHook;
        let target = TypeDescriptor::of::<Invoice>();
        for version in [
            SchemaVersion::Unversioned,
            SchemaVersion::Unspecified,
            SchemaVersion::Explicit(3),
        ] {
            assert!(!hook.can_recover(target, version));
        }
    }

    #[test]
    fn test_select_decoder_is_passthrough() {
        let member = MemberMap::new("total", "total", |i: &mut Invoice, v: f64| i.total = v);
        let descriptor = MemberDescriptor::Mapped(&member);
        let selection = DefaultHook
            .select_decoder(&descriptor, TypeDescriptor::of::<Invoice>(), SchemaVersion::Explicit(1))
            .unwrap();
        assert!(!selection.is_empty());
        assert!(selection.is_passthrough_of(&descriptor));
    }

    #[test]
    fn test_contexts_are_fresh_and_share_one_slot() {
        let target = TypeDescriptor::of::<Invoice>();
        let mut first = DefaultHook.create_context(target);
        let second = DefaultHook.create_context(target);

        first.insert_extra_element("memo", Bson::String("paid".into()));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(first.slot().unwrap().same_slot(second.slot().unwrap()));
    }

    #[test]
    fn test_dispose_leaves_object_untouched() {
        let mut context = DefaultHook.create_context(TypeDescriptor::of::<ExtraMembers>());
        context.insert_extra_element("memo", Bson::Int32(1));

        let mut holder = ExtraMembers::default();
        DefaultHook
            .dispose_extra_elements(&mut holder, context, 0)
            .unwrap();
        assert!(holder.elements.is_empty());
    }
}
