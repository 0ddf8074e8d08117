//! Rule-based migration keyed on schema versions.
//!
//! A [`VersionedMigrationHook`] holds one [`TypePolicy`] per target type. The
//! policy declares which document versions it can recover, which elements to
//! decode differently ([`FieldRule`]), and whether extra elements should be
//! kept on the constructed object.
//!
//! # Example
//!
//! ```
//! use netabase_migrate::prelude::*;
//!
//! #[derive(Default)]
//! struct Customer {
//!     full_name: String,
//! }
//!
//! // Version 1 documents stored the name under `name`.
//! let hook = VersionedMigrationHook::new().policy(
//!     TypePolicy::for_type::<Customer>(1..=2).rule(
//!         FieldRule::new("name", 1..=1)
//!             .decode_with(ValueDecoder::<String>::shared())
//!             .assign_to(|c: &mut Customer, name: String| c.full_name = name),
//!     ),
//! );
//!
//! let target = TypeDescriptor::of::<Customer>();
//! assert!(hook.can_recover(target, SchemaVersion::Explicit(1)));
//! assert!(!hook.can_recover(target, SchemaVersion::Explicit(3)));
//! assert!(!hook.can_recover(target, SchemaVersion::Unversioned));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use log::{trace, warn};

use crate::decoder::{FieldDecoder, RawDecoder, TypeDescriptor};
use crate::errors::NetabaseResult;
use crate::traits::migration::{
    HookKind, MigrationContext, MigrationHook, SchemaVersion, SerializerSelection,
};
use crate::traits::registery::{Assignment, MemberDescriptor};

/// How one element is decoded for a range of document versions.
#[derive(Clone)]
pub struct FieldRule {
    element_name: String,
    versions: RangeInclusive<i32>,
    decoder: Option<Arc<dyn FieldDecoder>>,
    assignment: Option<Assignment>,
    actual_type: Option<TypeDescriptor>,
}

impl FieldRule {
    pub fn new(element_name: impl Into<String>, versions: RangeInclusive<i32>) -> Self {
        Self {
            element_name: element_name.into(),
            versions,
            decoder: None,
            assignment: None,
            actual_type: None,
        }
    }

    pub fn decode_with(mut self, decoder: Arc<dyn FieldDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Shorthand for [`FieldRule::assign`] with a typed setter.
    pub fn assign_to<P: Any, V: Any>(self, setter: impl Fn(&mut P, V) + Send + Sync + 'static) -> Self {
        self.assign(Assignment::typed(setter))
    }

    /// Decode the element as `actual` instead of its declared type.
    ///
    /// Without [`FieldRule::decode_with`] or [`FieldRule::assign`] the rule
    /// reuses the member's own decoder and setter, so the setter must accept
    /// `actual`. An unmapped element has neither and stays an extra element.
    pub fn actual_type(mut self, actual: TypeDescriptor) -> Self {
        self.actual_type = Some(actual);
        self
    }

    /// Decode the element and throw the value away.
    pub fn discard(mut self) -> Self {
        self.decoder = Some(Arc::new(RawDecoder));
        self.assignment = None;
        self
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn versions(&self) -> &RangeInclusive<i32> {
        &self.versions
    }

    pub fn matches(&self, element_name: &str, version: i32) -> bool {
        self.element_name == element_name && self.versions.contains(&version)
    }

    fn selection(&self, descriptor: &MemberDescriptor<'_>) -> SerializerSelection {
        if self.decoder.is_none() && self.assignment.is_none() {
            return match self.actual_type {
                Some(actual) => SerializerSelection::new(
                    descriptor.default_decoder().cloned(),
                    descriptor.default_assignment().cloned(),
                    Some(actual),
                ),
                None => SerializerSelection::empty(),
            };
        }
        SerializerSelection::new(
            self.decoder.clone(),
            self.assignment.clone(),
            self.actual_type,
        )
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("element_name", &self.element_name)
            .field("versions", &self.versions)
            .field(
                "decoder",
                &self.decoder.as_ref().map(|decoder| decoder.value_type()),
            )
            .field("assignment", &self.assignment)
            .field("actual_type", &self.actual_type)
            .finish()
    }
}

/// Everything the hook knows about one target type.
#[derive(Debug, Clone)]
pub struct TypePolicy {
    target: TypeDescriptor,
    versions: RangeInclusive<i32>,
    rules: Vec<FieldRule>,
    capture_extra_elements: bool,
}

impl TypePolicy {
    /// A policy for `T` recovering documents whose version lies in `versions`.
    /// Documents without a version element count as version 0.
    pub fn for_type<T: Any>(versions: RangeInclusive<i32>) -> Self {
        Self {
            target: TypeDescriptor::of::<T>(),
            versions,
            rules: Vec::new(),
            capture_extra_elements: false,
        }
    }

    /// Add a rule. Earlier rules win when several match.
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Keep extra elements by writing them into the object's extra-elements
    /// slot.
    pub fn capture_extra_elements(mut self) -> Self {
        self.capture_extra_elements = true;
        self
    }

    pub fn target(&self) -> TypeDescriptor {
        self.target
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn captures_extra_elements(&self) -> bool {
        self.capture_extra_elements
    }

    pub fn covers(&self, version: SchemaVersion) -> bool {
        version
            .number()
            .is_some_and(|number| self.versions.contains(&number))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VersionedMigrationHook {
    policies: HashMap<TypeDescriptor, TypePolicy>,
}

impl VersionedMigrationHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy, replacing any earlier policy for the same type.
    pub fn policy(mut self, policy: TypePolicy) -> Self {
        self.policies.insert(policy.target(), policy);
        self
    }

    pub fn policy_for(&self, target: TypeDescriptor) -> Option<&TypePolicy> {
        self.policies.get(&target)
    }
}

impl MigrationHook for VersionedMigrationHook {
    fn kind(&self) -> HookKind {
        HookKind::VersionedMigration
    }

    fn can_recover(&self, target: TypeDescriptor, version: SchemaVersion) -> bool {
        self.policy_for(target)
            .is_some_and(|policy| policy.covers(version))
    }

    fn create_context(&self, target: TypeDescriptor) -> MigrationContext {
        MigrationContext::new(target)
    }

    fn select_decoder(
        &self,
        descriptor: &MemberDescriptor<'_>,
        target: TypeDescriptor,
        version: SchemaVersion,
    ) -> NetabaseResult<SerializerSelection> {
        let (Some(policy), Some(number)) = (self.policy_for(target), version.number()) else {
            return Ok(SerializerSelection::empty());
        };
        if !policy.covers(version) {
            return Ok(SerializerSelection::empty());
        }

        Ok(policy
            .rules
            .iter()
            .find(|rule| rule.matches(descriptor.element_name(), number))
            .map(|rule| rule.selection(descriptor))
            .unwrap_or_default())
    }

    fn dispose_extra_elements(
        &self,
        object: &mut dyn Any,
        context: MigrationContext,
        version: i32,
    ) -> NetabaseResult<()> {
        let target = context.target();
        let count = context.len();
        let capture = self
            .policy_for(target)
            .is_some_and(TypePolicy::captures_extra_elements);

        if !capture {
            trace!(
                "VersionedMigrationHook: Dropping {} extra element(s) of {} (v{})",
                count, target, version
            );
            return Ok(());
        }

        if !context.write_to(object)? {
            warn!(
                "VersionedMigrationHook: {} has no extra elements slot, dropping {} element(s)",
                target, count
            );
        }
        Ok(())
    }
}
