//! Member metadata: how one document element maps onto one member of a
//! target type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bson::Document;
use derive_more::From;
use serde::de::DeserializeOwned;

use crate::decoder::{DecodedValue, DocumentDecoder, FieldDecoder, TypeDescriptor, ValueDecoder};
use crate::errors::{NetabaseError, NetabaseResult};

type AssignFn = dyn Fn(&mut dyn Any, DecodedValue) -> NetabaseResult<()> + Send + Sync;
type WriteExtrasFn = dyn Fn(&mut dyn Any, Document) -> NetabaseResult<()> + Send + Sync;

/// Writes a decoded value into a parent object.
///
/// Cheap to clone; clones share the same underlying procedure, which is what
/// [`Assignment::ptr_eq`] compares.
#[derive(Clone)]
pub struct Assignment {
    parent: TypeDescriptor,
    assign: Arc<AssignFn>,
}

impl Assignment {
    /// Build an assignment from a typed setter. Both the parent and the value
    /// are downcast before `setter` runs; a mismatch on either side is an error.
    ///
    /// ```
    /// use netabase_migrate::decoder::DecodedValue;
    /// use netabase_migrate::traits::registery::Assignment;
    ///
    /// #[derive(Default)]
    /// struct Person { age: i32 }
    ///
    /// let assign = Assignment::typed(|p: &mut Person, age: i32| p.age = age);
    /// let mut person = Person::default();
    /// assign.assign(&mut person, DecodedValue::new(41_i32)).unwrap();
    /// assert_eq!(person.age, 41);
    /// ```
    pub fn typed<P, V>(setter: impl Fn(&mut P, V) + Send + Sync + 'static) -> Self
    where
        P: Any,
        V: Any,
    {
        Self {
            parent: TypeDescriptor::of::<P>(),
            assign: Arc::new(move |parent: &mut dyn Any, value: DecodedValue| {
                let parent =
                    parent
                        .downcast_mut::<P>()
                        .ok_or(NetabaseError::ParentTypeMismatch {
                            expected: std::any::type_name::<P>(),
                        })?;
                setter(parent, value.downcast::<V>()?);
                Ok(())
            }),
        }
    }

    /// Build an assignment over the untyped parent and value, for callers that
    /// route values themselves.
    pub fn from_fn(
        parent: TypeDescriptor,
        assign: impl Fn(&mut dyn Any, DecodedValue) -> NetabaseResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            parent,
            assign: Arc::new(assign),
        }
    }

    pub fn parent_type(&self) -> TypeDescriptor {
        self.parent
    }

    pub fn assign(&self, parent: &mut dyn Any, value: DecodedValue) -> NetabaseResult<()> {
        (self.assign)(parent, value)
    }

    pub fn ptr_eq(&self, other: &Assignment) -> bool {
        Arc::ptr_eq(&self.assign, &other.assign)
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Maps one document element onto one member of a target type, with the
/// decoder and assignment used when no hook overrides them.
#[derive(Clone)]
pub struct MemberMap {
    element_name: String,
    member_name: &'static str,
    declared_type: TypeDescriptor,
    decoder: Arc<dyn FieldDecoder>,
    assignment: Assignment,
}

impl MemberMap {
    /// A member whose value is decoded through serde.
    pub fn new<P, V>(
        element_name: impl Into<String>,
        member_name: &'static str,
        setter: impl Fn(&mut P, V) + Send + Sync + 'static,
    ) -> Self
    where
        P: Any,
        V: DeserializeOwned + Send + Any,
    {
        Self {
            element_name: element_name.into(),
            member_name,
            declared_type: TypeDescriptor::of::<V>(),
            decoder: ValueDecoder::<V>::shared(),
            assignment: Assignment::typed(setter),
        }
    }

    /// A member holding a class-mapped sub-document.
    pub fn nested<P, V>(
        element_name: impl Into<String>,
        member_name: &'static str,
        setter: impl Fn(&mut P, V) + Send + Sync + 'static,
    ) -> Self
    where
        P: Any,
        V: Any + Send,
    {
        Self {
            element_name: element_name.into(),
            member_name,
            declared_type: TypeDescriptor::of::<V>(),
            decoder: Arc::new(DocumentDecoder::of::<V>()),
            assignment: Assignment::typed(setter),
        }
    }

    /// Replace the default decoder. The declared type is left untouched.
    pub fn with_decoder(mut self, decoder: Arc<dyn FieldDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn member_name(&self) -> &'static str {
        self.member_name
    }

    pub fn declared_type(&self) -> TypeDescriptor {
        self.declared_type
    }

    pub fn decoder(&self) -> &Arc<dyn FieldDecoder> {
        &self.decoder
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }
}

impl fmt::Debug for MemberMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMap")
            .field("element_name", &self.element_name)
            .field("member_name", &self.member_name)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

/// What the decoder knows about the element it is about to process.
#[derive(Debug, Clone, Copy, From)]
pub enum MemberDescriptor<'a> {
    /// The element maps onto a known member.
    Mapped(&'a MemberMap),
    /// The element has no member on the target type.
    Unmapped(&'a str),
}

impl<'a> MemberDescriptor<'a> {
    pub fn element_name(&self) -> &'a str {
        match *self {
            MemberDescriptor::Mapped(member) => member.element_name(),
            MemberDescriptor::Unmapped(element_name) => element_name,
        }
    }

    pub fn member(&self) -> Option<&'a MemberMap> {
        match *self {
            MemberDescriptor::Mapped(member) => Some(member),
            MemberDescriptor::Unmapped(_) => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, MemberDescriptor::Mapped(_))
    }

    pub fn declared_type(&self) -> Option<TypeDescriptor> {
        self.member().map(MemberMap::declared_type)
    }

    pub fn default_decoder(&self) -> Option<&'a Arc<dyn FieldDecoder>> {
        self.member().map(MemberMap::decoder)
    }

    pub fn default_assignment(&self) -> Option<&'a Assignment> {
        self.member().map(MemberMap::assignment)
    }
}

/// Handle on the member of a target type that receives accrued extra
/// elements.
#[derive(Clone)]
pub struct ExtraElementsSlot {
    owner: TypeDescriptor,
    member_name: &'static str,
    write: Arc<WriteExtrasFn>,
}

impl ExtraElementsSlot {
    pub fn new<T: Any>(
        member_name: &'static str,
        setter: impl Fn(&mut T, Document) + Send + Sync + 'static,
    ) -> Self {
        Self {
            owner: TypeDescriptor::of::<T>(),
            member_name,
            write: Arc::new(move |object: &mut dyn Any, elements: Document| {
                let object =
                    object
                        .downcast_mut::<T>()
                        .ok_or(NetabaseError::ParentTypeMismatch {
                            expected: std::any::type_name::<T>(),
                        })?;
                setter(object, elements);
                Ok(())
            }),
        }
    }

    pub fn owner(&self) -> TypeDescriptor {
        self.owner
    }

    pub fn member_name(&self) -> &'static str {
        self.member_name
    }

    pub fn write(&self, object: &mut dyn Any, elements: Document) -> NetabaseResult<()> {
        (self.write)(object, elements)
    }

    /// Whether both handles were produced by the same registration.
    pub fn same_slot(&self, other: &ExtraElementsSlot) -> bool {
        Arc::ptr_eq(&self.write, &other.write)
    }
}

impl fmt::Debug for ExtraElementsSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraElementsSlot")
            .field("owner", &self.owner)
            .field("member_name", &self.member_name)
            .finish_non_exhaustive()
    }
}
