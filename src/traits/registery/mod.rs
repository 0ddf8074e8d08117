//! Reflection metadata mapping document elements onto target-type members.
//!
//! Member access is expressed as a pair of capabilities resolved once, when a
//! type's [`ClassMap`] is built: a [`FieldDecoder`](crate::decoder::FieldDecoder)
//! that turns a raw BSON value into a [`DecodedValue`](crate::decoder::DecodedValue),
//! and an [`Assignment`] that writes it into the parent object.

pub mod class_map;
pub mod member;

pub use class_map::*;
pub use member::*;
