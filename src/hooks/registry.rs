//! The slot holding the active migration hook.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::debug;

use super::DefaultHook;
use crate::errors::{NetabaseError, NetabaseResult};
use crate::traits::migration::MigrationHook;

static GLOBAL_REGISTRY: OnceLock<Arc<HookRegistry>> = OnceLock::new();

/// Holds the hook every decode started from now on will use.
///
/// The registry is never empty: it starts out holding [`DefaultHook`] and a
/// replacement must always supply a hook. Decodes take a snapshot of the
/// current hook when they start, so replacing it is only observed by decodes
/// started afterwards.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use netabase_migrate::prelude::*;
///
/// let registry = HookRegistry::new();
/// assert_eq!(registry.current().kind(), HookKind::Noop);
///
/// registry.replace(VersionedMigrationHook::new());
/// assert_eq!(registry.current().kind(), HookKind::VersionedMigration);
///
/// // An absent hook is rejected and the previous one stays active.
/// assert!(registry.install(None).is_err());
/// assert_eq!(registry.current().kind(), HookKind::VersionedMigration);
/// ```
#[derive(Debug)]
pub struct HookRegistry {
    current: RwLock<Arc<dyn MigrationHook>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::with_hook(Arc::new(DefaultHook))
    }

    pub fn with_hook(hook: Arc<dyn MigrationHook>) -> Self {
        Self {
            current: RwLock::new(hook),
        }
    }

    /// The process-wide registry, for applications that do not pass one
    /// through their decode pipeline.
    pub fn global() -> &'static Arc<HookRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| Arc::new(HookRegistry::new()))
    }

    pub fn current(&self) -> Arc<dyn MigrationHook> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Make `hook` the active hook and return the one it replaces.
    ///
    /// `None` is a configuration error; the active hook is left unchanged.
    pub fn install(
        &self,
        hook: Option<Arc<dyn MigrationHook>>,
    ) -> NetabaseResult<Arc<dyn MigrationHook>> {
        let hook = hook.ok_or(NetabaseError::MissingHook)?;
        Ok(self.swap(hook))
    }

    pub fn replace<H: MigrationHook + 'static>(&self, hook: H) -> Arc<dyn MigrationHook> {
        let hook: Arc<dyn MigrationHook> = Arc::new(hook);
        self.swap(hook)
    }

    fn swap(&self, hook: Arc<dyn MigrationHook>) -> Arc<dyn MigrationHook> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "HookRegistry: Replacing {} hook with {} hook",
            current.kind(),
            hook.kind()
        );
        std::mem::replace(&mut *current, hook)
    }

    /// Reinstall the [`DefaultHook`].
    pub fn reset(&self) -> Arc<dyn MigrationHook> {
        self.replace(DefaultHook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::migration::HookKind;

    #[test]
    fn test_starts_with_default_hook() {
        assert_eq!(HookRegistry::new().current().kind(), HookKind::Noop);
        assert_eq!(HookRegistry::default().current().kind(), HookKind::Noop);
    }

    #[test]
    fn test_install_returns_previous() {
        let registry = HookRegistry::new();
        let custom: Arc<dyn MigrationHook> = Arc::new(crate::hooks::VersionedMigrationHook::new());
        let previous = registry.install(Some(Arc::clone(&custom))).unwrap();
        assert_eq!(previous.kind(), HookKind::Noop);
        assert!(Arc::ptr_eq(&registry.current(), &custom));
    }

    #[test]
    fn test_install_none_keeps_previous() {
        let registry = HookRegistry::new();
        let before = registry.current();
        let err = registry.install(None).unwrap_err();
        assert!(matches!(err, NetabaseError::MissingHook));
        assert!(Arc::ptr_eq(&before, &registry.current()));
    }

    #[test]
    fn test_replace_and_install_share_the_slot() {
        let registry = HookRegistry::new();
        let custom: Arc<dyn MigrationHook> = Arc::new(crate::hooks::VersionedMigrationHook::new());
        registry.install(Some(Arc::clone(&custom))).unwrap();

        let previous = registry.replace(DefaultHook);
        assert!(Arc::ptr_eq(&previous, &custom));
        assert_eq!(registry.current().kind(), HookKind::Noop);

        let previous = registry.install(Some(custom)).unwrap();
        assert_eq!(previous.kind(), HookKind::Noop);
        assert_eq!(registry.current().kind(), HookKind::VersionedMigration);
    }

    #[test]
    fn test_reset() {
        let registry = HookRegistry::new();
        registry.replace(crate::hooks::VersionedMigrationHook::new());
        let previous = registry.reset();
        assert_eq!(previous.kind(), HookKind::VersionedMigration);
        assert_eq!(registry.current().kind(), HookKind::Noop);
    }
}
