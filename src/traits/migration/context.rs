//! Per-document migration context.
//!
//! One context is created for every document and every nested sub-document
//! the decoder reconstructs. It collects the elements that have no member on
//! the target type, and remembers which slot of the constructed object should
//! receive them.
//!
//! # Ownership
//!
//! A context is an owned value: the decode that created it is the only one
//! that can reach it, and [`MigrationHook::dispose_extra_elements`] takes it
//! by value. It is deliberately not `Clone`, so extra elements can never leak
//! from one document into another.
//!
//! [`MigrationHook::dispose_extra_elements`]: super::MigrationHook::dispose_extra_elements

use std::any::Any;

use bson::{Bson, Document};

use crate::decoder::TypeDescriptor;
use crate::errors::NetabaseResult;
use crate::traits::registery::ExtraElementsSlot;

/// Scratch state for one document or sub-document.
///
/// ```
/// use bson::Bson;
/// use netabase_migrate::decoder::TypeDescriptor;
/// use netabase_migrate::traits::migration::MigrationContext;
///
/// struct Person;
///
/// let mut ctx = MigrationContext::new(TypeDescriptor::of::<Person>());
/// assert!(ctx.is_empty());
///
/// ctx.insert_extra_element("nickname", Bson::String("Al".into()));
/// assert_eq!(ctx.len(), 1);
/// assert!(ctx.slot().is_none());
/// ```
#[derive(Debug)]
pub struct MigrationContext {
    target: TypeDescriptor,
    extra_elements: Document,
    slot: Option<ExtraElementsSlot>,
}

impl MigrationContext {
    pub fn new(target: TypeDescriptor) -> Self {
        Self {
            target,
            extra_elements: Document::new(),
            slot: None,
        }
    }

    /// Create a context already pointing at the slot that receives extras.
    pub fn with_slot(target: TypeDescriptor, slot: ExtraElementsSlot) -> Self {
        Self {
            slot: Some(slot),
            ..Self::new(target)
        }
    }

    /// The declared type of the (sub-)document this context belongs to.
    pub fn target(&self) -> TypeDescriptor {
        self.target
    }

    /// Record an element with no member on the target type. A repeated
    /// element name replaces the earlier value.
    pub fn insert_extra_element(&mut self, name: impl Into<String>, value: Bson) {
        self.extra_elements.insert(name, value);
    }

    pub fn extra_elements(&self) -> &Document {
        &self.extra_elements
    }

    pub fn len(&self) -> usize {
        self.extra_elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extra_elements.is_empty()
    }

    pub fn slot(&self) -> Option<&ExtraElementsSlot> {
        self.slot.as_ref()
    }

    pub fn bind_slot(&mut self, slot: ExtraElementsSlot) {
        self.slot = Some(slot);
    }

    pub fn into_extra_elements(self) -> Document {
        self.extra_elements
    }

    /// Write the accrued extras into `object` through the bound slot.
    ///
    /// Returns `false` without touching `object` when no slot is bound.
    pub fn write_to(self, object: &mut dyn Any) -> NetabaseResult<bool> {
        match self.slot {
            Some(slot) => {
                slot.write(object, self.extra_elements)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[derive(Default)]
    struct Holder {
        extras: Document,
    }

    #[test]
    fn test_repeated_element_overwrites() {
        let mut ctx = MigrationContext::new(TypeDescriptor::of::<Holder>());
        ctx.insert_extra_element("a", Bson::Int32(1));
        ctx.insert_extra_element("a", Bson::Int32(2));
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.into_extra_elements(), doc! { "a": 2 });
    }

    #[test]
    fn test_write_to_bound_slot() {
        let slot = ExtraElementsSlot::new("extras", |h: &mut Holder, d: Document| h.extras = d);
        let mut ctx = MigrationContext::with_slot(TypeDescriptor::of::<Holder>(), slot);
        ctx.insert_extra_element("legacy", Bson::Boolean(true));

        let mut holder = Holder::default();
        assert!(ctx.write_to(&mut holder).unwrap());
        assert_eq!(holder.extras, doc! { "legacy": true });
    }

    #[test]
    fn test_write_to_without_slot_is_noop() {
        let mut ctx = MigrationContext::new(TypeDescriptor::of::<Holder>());
        ctx.insert_extra_element("legacy", Bson::Boolean(true));

        let mut holder = Holder::default();
        assert!(!ctx.write_to(&mut holder).unwrap());
        assert!(holder.extras.is_empty());
    }
}
