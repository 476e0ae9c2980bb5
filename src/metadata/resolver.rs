//! Cross-assembly resolution.
//!
//! A module resolves type references scoped to another assembly through its
//! [`AssemblyResolver`]. [`ModuleCache`] is the stock resolver: a concurrent map from assembly
//! name to the modules loaded so far.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::metadata::{identity::AssemblyIdentity, module::ModuleDefinition};

/// Finds the module that implements an assembly
pub trait AssemblyResolver: Send + Sync {
    /// The manifest module of the assembly identified by `identity`
    fn resolve(&self, identity: &AssemblyIdentity) -> Option<Arc<ModuleDefinition>>;
}

/// Resolver over a set of registered modules, keyed by case-insensitive assembly name.
///
/// Entries are weak; a module dropped by its owner disappears from the cache.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use dotmodel::metadata::resolver::{AssemblyResolver, ModuleCache};
/// use dotmodel::metadata::identity::AssemblyIdentity;
/// use dotmodel::prelude::*;
///
/// let library = ModuleDefinition::new("Library.dll");
/// let cache = ModuleCache::new();
/// cache.register(&library);
///
/// let identity = AssemblyIdentity::parse("library, Version=1.0.0.0")?;
/// assert!(Arc::ptr_eq(&cache.resolve(&identity).unwrap(), &library));
/// # Ok::<(), dotmodel::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: DashMap<String, Weak<ModuleDefinition>>,
}

impl ModuleCache {
    /// Creates an empty cache
    #[must_use]
    pub fn new() -> Self {
        ModuleCache {
            modules: DashMap::new(),
        }
    }

    /// Registers `module` under its assembly name, replacing any previous entry
    pub fn register(&self, module: &Arc<ModuleDefinition>) {
        let key = module.effective_identity().name.to_ascii_lowercase();
        self.modules.insert(key, Arc::downgrade(module));
    }

    /// Removes the entry for `name`. Returns true if there was one.
    pub fn unregister(&self, name: &str) -> bool {
        self.modules.remove(&name.to_ascii_lowercase()).is_some()
    }

    /// Drops entries whose module no longer exists
    pub fn purge(&self) {
        self.modules.retain(|_, module| module.strong_count() > 0);
    }

    /// Number of entries, including dead ones not yet purged
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl AssemblyResolver for ModuleCache {
    fn resolve(&self, identity: &AssemblyIdentity) -> Option<Arc<ModuleDefinition>> {
        self.modules
            .get(&identity.name.to_ascii_lowercase())
            .and_then(|entry| entry.value().upgrade())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::AssemblyVersion;

    #[test]
    fn dead_modules_are_not_resolved() {
        let cache = ModuleCache::new();
        {
            let transient = ModuleDefinition::new("Transient.dll");
            cache.register(&transient);
        }

        let identity = AssemblyIdentity::new("Transient", AssemblyVersion::default());
        assert!(cache.resolve(&identity).is_none());
        assert_eq!(cache.len(), 1);

        cache.purge();
        assert!(cache.is_empty());
    }

    #[test]
    fn explicit_identity_takes_precedence() {
        let module = ModuleDefinition::new("file-name.dll");
        module.set_assembly(Some(AssemblyIdentity::new(
            "Assembly.Name",
            AssemblyVersion::new(2, 0, 0, 0),
        )));

        let cache = ModuleCache::new();
        cache.register(&module);

        let by_assembly = AssemblyIdentity::new("assembly.name", AssemblyVersion::default());
        assert!(cache.resolve(&by_assembly).is_some());
        assert!(cache.unregister("ASSEMBLY.NAME"));
        assert!(cache.resolve(&by_assembly).is_none());
    }
}
