// Common test utilities and fixtures
#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use bson::Document;
use netabase_migrate::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub extras: Document,
}

/// Shape of an address before `street` was split out of `line`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LegacyAddress {
    pub line: String,
}

impl From<LegacyAddress> for Address {
    fn from(legacy: LegacyAddress) -> Self {
        Address {
            street: legacy.line,
            city: String::new(),
            extras: Document::new(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub old_name: Option<String>,
    pub new_name: Option<Address>,
    pub address: Option<Address>,
    pub extras: Document,
}

/// A type that no longer has any member for its legacy `nick` element.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Contact {
    pub display_name: String,
    pub extras: Document,
}

/// A type without versioning and without an extra-elements member.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tag {
    pub label: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    pub value: i32,
    pub child: Option<Box<Node>>,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn class_maps() -> Arc<ClassMapRegistry> {
    let registry = ClassMapRegistry::new();

    registry
        .register(
            ClassMap::builder::<Address>()
                .field("street", "street", |a: &mut Address, v: String| a.street = v)
                .field("city", "city", |a: &mut Address, v: String| a.city = v)
                .extra_elements("extras", |a: &mut Address, extras| a.extras = extras)
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ClassMap::builder::<LegacyAddress>()
                .field("line", "line", |a: &mut LegacyAddress, v: String| a.line = v)
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ClassMap::builder::<Person>()
                .versioned()
                .field("name", "name", |p: &mut Person, v: String| p.name = v)
                .field("age", "age", |p: &mut Person, v: i32| p.age = v)
                .field("oldName", "old_name", |p: &mut Person, v: String| {
                    p.old_name = Some(v)
                })
                .nested("newName", "new_name", |p: &mut Person, v: Address| {
                    p.new_name = Some(v)
                })
                .nested("address", "address", |p: &mut Person, v: Address| {
                    p.address = Some(v)
                })
                .extra_elements("extras", |p: &mut Person, extras| p.extras = extras)
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ClassMap::builder::<Contact>()
                .versioned()
                .field("displayName", "display_name", |c: &mut Contact, v: String| {
                    c.display_name = v
                })
                .extra_elements("extras", |c: &mut Contact, extras| c.extras = extras)
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ClassMap::builder::<Tag>()
                .field("label", "label", |t: &mut Tag, v: String| t.label = v)
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ClassMap::builder::<Node>()
                .field("value", "value", |n: &mut Node, v: i32| n.value = v)
                .nested("child", "child", |n: &mut Node, v: Node| {
                    n.child = Some(Box::new(v))
                })
                .build()
                .unwrap(),
        )
        .unwrap();

    Arc::new(registry)
}

pub fn decoder_with_hook(hook: impl MigrationHook + 'static) -> ObjectDecoder {
    let hooks = Arc::new(HookRegistry::new());
    hooks.replace(hook);
    ObjectDecoder::new(DecoderConfig::default(), class_maps(), hooks)
}

pub fn default_decoder() -> ObjectDecoder {
    ObjectDecoder::with_class_maps(class_maps())
}

/// Always answers "no opinion", so the decoder runs its own default path.
#[derive(Debug, Default)]
pub struct DeferringHook;

impl MigrationHook for DeferringHook {
    fn can_recover(&self, _target: TypeDescriptor, _version: SchemaVersion) -> bool {
        false
    }

    fn create_context(&self, target: TypeDescriptor) -> MigrationContext {
        MigrationContext::new(target)
    }

    fn select_decoder(
        &self,
        _descriptor: &MemberDescriptor<'_>,
        _target: TypeDescriptor,
        _version: SchemaVersion,
    ) -> NetabaseResult<SerializerSelection> {
        Ok(SerializerSelection::empty())
    }

    fn dispose_extra_elements(
        &self,
        _object: &mut dyn Any,
        _context: MigrationContext,
        _version: i32,
    ) -> NetabaseResult<()> {
        Ok(())
    }
}

/// Recovers every Person version and keeps extras on both Person and Address.
pub fn capturing_hook() -> VersionedMigrationHook {
    VersionedMigrationHook::new()
        .policy(TypePolicy::for_type::<Person>(0..=5).capture_extra_elements())
        .policy(TypePolicy::for_type::<Address>(0..=5).capture_extra_elements())
}
