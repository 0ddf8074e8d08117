//! Class maps and the registry that caches them.
//!
//! A class map is built once per target type and shared behind an `Arc`;
//! decoding never rebuilds member metadata.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use bson::Document;
use log::debug;
use serde::de::DeserializeOwned;

use super::member::{ExtraElementsSlot, MemberMap};
use crate::decoder::TypeDescriptor;
use crate::errors::{NetabaseError, NetabaseResult};

type CreateFn = fn() -> Box<dyn Any + Send>;

fn create_default<T: Default + Send + Any>() -> Box<dyn Any + Send> {
    Box::new(T::default())
}

/// Reflection metadata for one target type.
pub struct ClassMap {
    target: TypeDescriptor,
    versioned: bool,
    create: CreateFn,
    members: Vec<MemberMap>,
    by_element: HashMap<String, usize>,
    extra_elements: Option<ExtraElementsSlot>,
}

impl ClassMap {
    /// Start a class map for `T`. Instances are created with `T::default()`
    /// before any element is assigned.
    ///
    /// ```
    /// use bson::Document;
    /// use netabase_migrate::traits::registery::ClassMap;
    ///
    /// #[derive(Default)]
    /// struct Person {
    ///     name: String,
    ///     extras: Document,
    /// }
    ///
    /// let map = ClassMap::builder::<Person>()
    ///     .versioned()
    ///     .field("name", "name", |p: &mut Person, name: String| p.name = name)
    ///     .extra_elements("extras", |p: &mut Person, extras| p.extras = extras)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(map.is_versioned());
    /// assert!(map.member("name").is_some());
    /// assert!(map.extra_elements_slot().is_some());
    /// ```
    pub fn builder<T: Default + Send + Any>() -> ClassMapBuilder<T> {
        ClassMapBuilder {
            create: create_default::<T>,
            versioned: false,
            members: Vec::new(),
            extra_elements: None,
            _marker: PhantomData,
        }
    }

    pub fn target(&self) -> TypeDescriptor {
        self.target
    }

    /// Whether documents of this type carry a schema version.
    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    pub fn members(&self) -> &[MemberMap] {
        &self.members
    }

    pub fn member(&self, element_name: &str) -> Option<&MemberMap> {
        self.by_element
            .get(element_name)
            .map(|&index| &self.members[index])
    }

    pub fn extra_elements_slot(&self) -> Option<&ExtraElementsSlot> {
        self.extra_elements.as_ref()
    }

    pub fn create_instance(&self) -> Box<dyn Any + Send> {
        (self.create)()
    }
}

impl fmt::Debug for ClassMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMap")
            .field("target", &self.target)
            .field("versioned", &self.versioned)
            .field("members", &self.members)
            .field("extra_elements", &self.extra_elements)
            .finish()
    }
}

pub struct ClassMapBuilder<T> {
    create: CreateFn,
    versioned: bool,
    members: Vec<MemberMap>,
    extra_elements: Option<ExtraElementsSlot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> ClassMapBuilder<T> {
    /// Mark the type as participating in schema versioning.
    pub fn versioned(mut self) -> Self {
        self.versioned = true;
        self
    }

    pub fn member(mut self, member: MemberMap) -> Self {
        self.members.push(member);
        self
    }

    /// Add a serde-decoded member.
    pub fn field<V>(
        self,
        element_name: impl Into<String>,
        member_name: &'static str,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: DeserializeOwned + Send + Any,
    {
        self.member(MemberMap::new(element_name, member_name, setter))
    }

    /// Add a member holding a class-mapped sub-document.
    pub fn nested<V: Any + Send>(
        self,
        element_name: impl Into<String>,
        member_name: &'static str,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        self.member(MemberMap::nested(element_name, member_name, setter))
    }

    /// Designate the member that may receive extra elements.
    pub fn extra_elements(
        mut self,
        member_name: &'static str,
        setter: impl Fn(&mut T, Document) + Send + Sync + 'static,
    ) -> Self {
        self.extra_elements = Some(ExtraElementsSlot::new(member_name, setter));
        self
    }

    pub fn build(self) -> NetabaseResult<ClassMap> {
        let target = TypeDescriptor::of::<T>();
        let mut by_element = HashMap::with_capacity(self.members.len());
        for (index, member) in self.members.iter().enumerate() {
            if by_element
                .insert(member.element_name().to_string(), index)
                .is_some()
            {
                return Err(NetabaseError::DuplicateElement {
                    type_name: target.name().to_string(),
                    element: member.element_name().to_string(),
                });
            }
        }

        Ok(ClassMap {
            target,
            versioned: self.versioned,
            create: self.create,
            members: self.members,
            by_element,
            extra_elements: self.extra_elements,
        })
    }
}

/// Registered class maps, keyed by target type.
#[derive(Debug, Default)]
pub struct ClassMapRegistry {
    maps: RwLock<HashMap<TypeDescriptor, Arc<ClassMap>>>,
}

impl ClassMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, class_map: ClassMap) -> NetabaseResult<Arc<ClassMap>> {
        let target = class_map.target();
        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
        if maps.contains_key(&target) {
            return Err(NetabaseError::DuplicateClassMap(target.name().to_string()));
        }
        let class_map = Arc::new(class_map);
        maps.insert(target, Arc::clone(&class_map));
        debug!("ClassMapRegistry: Registered {}", target);
        Ok(class_map)
    }

    /// Return the class map for `target`, building it with `build` if no
    /// thread registered one yet. `build` runs at most once per target.
    pub fn get_or_register(
        &self,
        target: TypeDescriptor,
        build: impl FnOnce() -> NetabaseResult<ClassMap>,
    ) -> NetabaseResult<Arc<ClassMap>> {
        if let Some(existing) = self.get(target) {
            return Ok(existing);
        }

        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = maps.get(&target) {
            return Ok(Arc::clone(existing));
        }
        let class_map = build()?;
        if class_map.target() != target {
            return Err(NetabaseError::TypeMismatch {
                expected: target.name(),
                found: class_map.target().name(),
            });
        }
        let class_map = Arc::new(class_map);
        maps.insert(target, Arc::clone(&class_map));
        debug!("ClassMapRegistry: Registered {} on first use", target);
        Ok(class_map)
    }

    pub fn lookup(&self, target: TypeDescriptor) -> NetabaseResult<Arc<ClassMap>> {
        self.get(target)
            .ok_or_else(|| NetabaseError::ClassMapNotRegistered(target.name().to_string()))
    }

    pub fn contains(&self, target: TypeDescriptor) -> bool {
        self.get(target).is_some()
    }

    pub fn len(&self) -> usize {
        self.maps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, target: TypeDescriptor) -> Option<Arc<ClassMap>> {
        self.maps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
            .cloned()
    }
}
