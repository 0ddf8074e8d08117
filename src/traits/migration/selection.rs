//! The hook's verdict on how one element is decoded and assigned.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::decoder::{DecodedValue, FieldDecoder, TypeDescriptor};
use crate::errors::NetabaseResult;
use crate::traits::registery::{Assignment, MemberDescriptor};

/// Which decoder to use for an element, where its value lands, and which
/// concrete type it is decoded as.
///
/// [`SerializerSelection::empty`] is the "no opinion" value: the decoder runs
/// its own default path. A selection produced by
/// [`SerializerSelection::passthrough`] names the member's default decoder
/// explicitly and is *not* empty, even though decoding with it gives the same
/// result.
///
/// A decoder without an assignment means "decode, then discard".
#[derive(Clone, Default)]
pub struct SerializerSelection {
    decoder: Option<Arc<dyn FieldDecoder>>,
    assignment: Option<Assignment>,
    actual_type: Option<TypeDescriptor>,
}

impl SerializerSelection {
    pub fn new(
        decoder: Option<Arc<dyn FieldDecoder>>,
        assignment: Option<Assignment>,
        actual_type: Option<TypeDescriptor>,
    ) -> Self {
        Self {
            decoder,
            assignment,
            actual_type,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The member's own decoder and assignment, with no type override.
    /// Unmapped elements have neither, so their pass-through is empty.
    pub fn passthrough(descriptor: &MemberDescriptor<'_>) -> Self {
        Self {
            decoder: descriptor.default_decoder().cloned(),
            assignment: descriptor.default_assignment().cloned(),
            actual_type: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decoder.is_none() && self.assignment.is_none()
    }

    /// Whether this selection is exactly the default path of `descriptor`.
    pub fn is_passthrough_of(&self, descriptor: &MemberDescriptor<'_>) -> bool {
        let same_decoder = match (&self.decoder, descriptor.default_decoder()) {
            (Some(ours), Some(theirs)) => Arc::ptr_eq(ours, theirs),
            (None, None) => true,
            _ => false,
        };
        let same_assignment = match (&self.assignment, descriptor.default_assignment()) {
            (Some(ours), Some(theirs)) => ours.ptr_eq(theirs),
            (None, None) => true,
            _ => false,
        };
        same_decoder && same_assignment && self.actual_type.is_none()
    }

    pub fn decoder(&self) -> Option<&Arc<dyn FieldDecoder>> {
        self.decoder.as_ref()
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    pub fn actual_type(&self) -> Option<TypeDescriptor> {
        self.actual_type
    }

    /// Hand `value` to the assignment, or drop it when there is none.
    pub fn apply_assignment(&self, parent: &mut dyn Any, value: DecodedValue) -> NetabaseResult<()> {
        match &self.assignment {
            Some(assignment) => assignment.assign(parent, value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for SerializerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerSelection")
            .field(
                "decoder",
                &self.decoder.as_ref().map(|decoder| decoder.value_type()),
            )
            .field("assignment", &self.assignment)
            .field("actual_type", &self.actual_type)
            .finish()
    }
}
