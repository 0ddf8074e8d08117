//! Runtime type identity and type-erased decoded values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use derive_more::Display;

use crate::errors::{NetabaseError, NetabaseResult};

/// Identity of a concrete Rust type, used wherever the decoder needs to talk
/// about "the type being reconstructed" without being generic over it.
#[derive(Clone, Copy, Display)]
#[display("{name}")]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The output of a [`FieldDecoder`](crate::decoder::FieldDecoder), waiting to
/// be handed to an assignment.
pub struct DecodedValue {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl DecodedValue {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap an already boxed object whose concrete type is `type_name`.
    pub(crate) fn from_boxed(inner: Box<dyn Any + Send>, type_name: &'static str) -> Self {
        Self { inner, type_name }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast<T: Any>(self) -> NetabaseResult<T> {
        let found = self.type_name;
        self.inner
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| NetabaseError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found,
            })
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodedValue({})", self.type_name)
    }
}
