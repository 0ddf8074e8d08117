//! Field decoders: the capability that turns one raw BSON value into a
//! decoded value.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bson::Bson;
use serde::de::DeserializeOwned;

use super::{DecodeScope, DecodedValue, TypeDescriptor};
use crate::errors::{NetabaseError, NetabaseResult};

pub trait FieldDecoder: Send + Sync {
    /// The type of the values this decoder produces.
    fn value_type(&self) -> TypeDescriptor;

    fn decode(&self, raw: &Bson, scope: &DecodeScope<'_>) -> NetabaseResult<DecodedValue>;
}

/// Decodes through serde, for any `T: DeserializeOwned`.
pub struct ValueDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValueDecoder<T>
where
    T: DeserializeOwned + Send + Any,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    pub fn shared() -> Arc<dyn FieldDecoder> {
        Arc::new(Self::new())
    }
}

impl<T> Default for ValueDecoder<T>
where
    T: DeserializeOwned + Send + Any,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldDecoder for ValueDecoder<T>
where
    T: DeserializeOwned + Send + Any,
{
    fn value_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn decode(&self, raw: &Bson, _scope: &DecodeScope<'_>) -> NetabaseResult<DecodedValue> {
        let value: T = bson::from_bson(raw.clone())?;
        Ok(DecodedValue::new(value))
    }
}

impl<T> fmt::Debug for ValueDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueDecoder<{}>", std::any::type_name::<T>())
    }
}

/// Decodes a sub-document through the class map of its type.
///
/// When the active selection carries an actual-type override, the override's
/// class map is used instead of the declared one.
#[derive(Debug, Clone, Copy)]
pub struct DocumentDecoder {
    declared: TypeDescriptor,
}

impl DocumentDecoder {
    pub fn new(declared: TypeDescriptor) -> Self {
        Self { declared }
    }

    pub fn of<T: Any>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }
}

impl FieldDecoder for DocumentDecoder {
    fn value_type(&self) -> TypeDescriptor {
        self.declared
    }

    fn decode(&self, raw: &Bson, scope: &DecodeScope<'_>) -> NetabaseResult<DecodedValue> {
        match raw {
            Bson::Document(document) => scope.decode_document(self.declared, document),
            other => Err(NetabaseError::TypeMismatch {
                expected: "document",
                found: element_kind(other),
            }),
        }
    }
}

/// Hands the raw BSON value through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl FieldDecoder for RawDecoder {
    fn value_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Bson>()
    }

    fn decode(&self, raw: &Bson, _scope: &DecodeScope<'_>) -> NetabaseResult<DecodedValue> {
        Ok(DecodedValue::new(raw.clone()))
    }
}

type ConvertFn<T> = dyn Fn(&Bson) -> NetabaseResult<T> + Send + Sync;

/// Decodes with a conversion closure, typically used by migrations whose old
/// representation no longer matches the new type.
///
/// ```
/// use bson::Bson;
/// use netabase_migrate::decoder::FnDecoder;
/// use netabase_migrate::errors::NetabaseError;
///
/// // Old documents stored a full name; new ones split it.
/// let split = FnDecoder::new(|raw: &Bson| match raw {
///     Bson::String(name) => Ok(name.split_whitespace().map(str::to_string).collect::<Vec<_>>()),
///     _ => Err(NetabaseError::Migration("expected a name".into())),
/// });
/// # let _ = split;
/// ```
pub struct FnDecoder<T> {
    convert: Box<ConvertFn<T>>,
}

impl<T: Any + Send> FnDecoder<T> {
    pub fn new(convert: impl Fn(&Bson) -> NetabaseResult<T> + Send + Sync + 'static) -> Self {
        Self {
            convert: Box::new(convert),
        }
    }
}

impl<T: Any + Send> FieldDecoder for FnDecoder<T> {
    fn value_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn decode(&self, raw: &Bson, _scope: &DecodeScope<'_>) -> NetabaseResult<DecodedValue> {
        (self.convert)(raw).map(DecodedValue::new)
    }
}

impl<T> fmt::Debug for FnDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnDecoder<{}>", std::any::type_name::<T>())
    }
}

/// Short name of a BSON value's element type, for error messages.
pub(crate) fn element_kind(raw: &Bson) -> &'static str {
    match raw {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Array(_) => "array",
        Bson::Document(_) => "document",
        Bson::Boolean(_) => "boolean",
        Bson::Null => "null",
        Bson::Int32(_) => "int32",
        Bson::Int64(_) => "int64",
        Bson::ObjectId(_) => "objectId",
        Bson::DateTime(_) => "date",
        Bson::Binary(_) => "binary",
        _ => "other",
    }
}
