//! Class-map object decoder.
//!
//! [`ObjectDecoder`] reconstructs statically typed objects from BSON
//! documents using the registered [`ClassMap`]s, and routes every element
//! through the active [`MigrationHook`].
//!
//! # Decode flow
//!
//! 1. The hook is snapshotted from the [`HookRegistry`] once per top-level
//!    document. Replacing the hook never affects a decode already running.
//! 2. The schema version is read once and threaded to every sub-document.
//! 3. Each document and sub-document gets its own [`MigrationContext`].
//! 4. Per element the hook's [`SerializerSelection`] is honoured; an empty
//!    selection runs the member's default decoder, or records the element as
//!    an extra when no member exists.
//! 5. Extras, if any, are handed to the hook after the object is built.

mod field;
mod value;

use std::any::Any;
use std::sync::Arc;

use bson::Document;
use log::{debug, trace};

pub use field::*;
pub use value::*;

use crate::config::DecoderConfig;
use crate::errors::{NetabaseError, NetabaseResult};
use crate::hooks::HookRegistry;
use crate::traits::migration::{MigrationContext, MigrationHook, SchemaVersion};
use crate::traits::registery::{ClassMap, ClassMapRegistry, MemberDescriptor};

/// Decodes BSON documents into registered target types.
#[derive(Debug, Clone)]
pub struct ObjectDecoder {
    config: DecoderConfig,
    class_maps: Arc<ClassMapRegistry>,
    hooks: Arc<HookRegistry>,
}

impl ObjectDecoder {
    pub fn new(
        config: DecoderConfig,
        class_maps: Arc<ClassMapRegistry>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        Self {
            config,
            class_maps,
            hooks,
        }
    }

    /// A decoder with the default configuration and its own hook registry
    /// holding the default hook.
    pub fn with_class_maps(class_maps: Arc<ClassMapRegistry>) -> Self {
        Self::new(
            DecoderConfig::default(),
            class_maps,
            Arc::new(HookRegistry::new()),
        )
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn class_maps(&self) -> &Arc<ClassMapRegistry> {
        &self.class_maps
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn decode<T: Any>(&self, document: &Document) -> NetabaseResult<T> {
        self.decode_as(TypeDescriptor::of::<T>(), document)?
            .downcast::<T>()
    }

    /// Decode a BSON-encoded document.
    pub fn decode_slice<T: Any>(&self, bytes: &[u8]) -> NetabaseResult<T> {
        let document = Document::from_reader(bytes)?;
        self.decode(&document)
    }

    /// Decode `document` as the registered type `target`.
    pub fn decode_as(
        &self,
        target: TypeDescriptor,
        document: &Document,
    ) -> NetabaseResult<DecodedValue> {
        let class_map = self.class_maps.lookup(target)?;
        let hook = self.hooks.current();
        let (version, version_read) = self.locate_version(&class_map, document)?;
        debug!(
            "ObjectDecoder: Decoding {} ({}) with {} hook",
            target,
            version,
            hook.kind()
        );

        let scope = DecodeScope {
            decoder: self,
            hook: &hook,
            version,
            version_read,
            depth: 0,
            actual_type: None,
        };
        scope.decode_object(&class_map, document)
    }

    /// The schema version of a top-level document of the given class map.
    pub fn read_version(
        &self,
        class_map: &ClassMap,
        document: &Document,
    ) -> NetabaseResult<SchemaVersion> {
        self.locate_version(class_map, document)
            .map(|(version, _)| version)
    }

    /// The schema version, and whether the version element supplied it.
    fn locate_version(
        &self,
        class_map: &ClassMap,
        document: &Document,
    ) -> NetabaseResult<(SchemaVersion, bool)> {
        if !class_map.is_versioned() {
            return Ok((SchemaVersion::Unversioned, false));
        }

        let element = self.config.version_element.as_str();
        let value = if self.config.version_must_lead {
            document
                .iter()
                .next()
                .filter(|(name, _)| name.as_str() == element)
                .map(|(_, value)| value)
        } else {
            document.get(element)
        };
        let version = SchemaVersion::from_element(element, value)?;
        Ok((version, value.is_some()))
    }
}

/// What a field decoder can see of the decode it is part of.
#[derive(Clone, Copy)]
pub struct DecodeScope<'a> {
    decoder: &'a ObjectDecoder,
    hook: &'a Arc<dyn MigrationHook>,
    version: SchemaVersion,
    version_read: bool,
    depth: usize,
    actual_type: Option<TypeDescriptor>,
}

impl<'a> DecodeScope<'a> {
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The hook snapshotted for this decode.
    pub fn hook(&self) -> &'a Arc<dyn MigrationHook> {
        self.hook
    }

    /// Sub-document nesting level; 0 is the top-level document.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The concrete type the current element should be decoded as, when the
    /// hook overrode the declared one.
    pub fn actual_type(&self) -> Option<TypeDescriptor> {
        self.actual_type
    }

    /// Decode a nested sub-document as `declared`, or as the actual-type
    /// override when one is in effect. The sub-document gets its own context.
    pub fn decode_document(
        &self,
        declared: TypeDescriptor,
        document: &Document,
    ) -> NetabaseResult<DecodedValue> {
        let depth = self.depth + 1;
        if depth > self.decoder.config.max_depth {
            return Err(NetabaseError::NestingTooDeep { depth });
        }

        let target = self.actual_type.unwrap_or(declared);
        let class_map = self.decoder.class_maps.lookup(target)?;
        let nested = DecodeScope {
            depth,
            version_read: false,
            actual_type: None,
            ..*self
        };
        nested.decode_object(&class_map, document)
    }

    fn with_actual_type(&self, actual_type: Option<TypeDescriptor>) -> Self {
        Self {
            actual_type,
            ..*self
        }
    }

    fn decode_object(
        &self,
        class_map: &ClassMap,
        document: &Document,
    ) -> NetabaseResult<DecodedValue> {
        let config = &self.decoder.config;
        let target = class_map.target();

        let mut context = self.hook.create_context(target);
        if context.slot().is_none() {
            if let Some(slot) = class_map.extra_elements_slot() {
                context.bind_slot(slot.clone());
            }
        }

        // Only the element the version was read from is skipped.
        let skip_version = self.depth == 0
            && self.version_read
            && class_map.member(&config.version_element).is_none();

        let mut object = class_map.create_instance();
        for (element, raw) in document {
            if skip_version && *element == config.version_element {
                continue;
            }

            let descriptor = match class_map.member(element) {
                Some(member) => MemberDescriptor::Mapped(member),
                None => MemberDescriptor::Unmapped(element.as_str()),
            };
            let selection = self.hook.select_decoder(&descriptor, target, self.version)?;

            if selection.is_empty() {
                match descriptor {
                    MemberDescriptor::Mapped(member) => {
                        let value = member.decoder().decode(raw, self)?;
                        member.assignment().assign(&mut *object, value)?;
                    }
                    MemberDescriptor::Unmapped(_) => {
                        trace!("ObjectDecoder: `{}` is extra on {}", element, target);
                        context.insert_extra_element(element.clone(), raw.clone());
                    }
                }
                continue;
            }

            trace!(
                "ObjectDecoder: `{}` on {} uses {:?}",
                element, target, selection
            );
            let scope = self.with_actual_type(selection.actual_type());
            let value = match selection.decoder().or(descriptor.default_decoder()) {
                Some(decoder) => decoder.decode(raw, &scope)?,
                None => RawDecoder.decode(raw, &scope)?,
            };
            selection.apply_assignment(&mut *object, value)?;
        }

        if !context.is_empty() {
            if !config.ignore_extra_elements && !self.hook.can_recover(target, self.version) {
                let element = context
                    .extra_elements()
                    .keys()
                    .next()
                    .cloned()
                    .unwrap_or_default();
                return Err(NetabaseError::UnexpectedElement {
                    type_name: target.name().to_string(),
                    element,
                });
            }

            debug!(
                "ObjectDecoder: Disposing {} extra element(s) of {}",
                context.len(),
                target
            );
            self.dispose(&mut *object, context)?;
        }

        Ok(DecodedValue::from_boxed(object, target.name()))
    }

    fn dispose(&self, object: &mut dyn Any, context: MigrationContext) -> NetabaseResult<()> {
        self.hook
            .dispose_extra_elements(object, context, self.version.disposal_value())
    }
}
