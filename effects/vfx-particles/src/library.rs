//! Named, versioned definition storage with reload support
//!
//! A reload never mutates a definition in place. The slot swaps in a new
//! `Arc` and bumps its version; instances notice the version change on their
//! next step and restart against the new definition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::definition::ParticleDefinition;
use crate::error::{ParticleError, Result};

/// Holder of the current definition for one effect name
#[derive(Debug)]
pub struct DefinitionSlot {
    name: String,
    version: AtomicU64,
    current: RwLock<Arc<ParticleDefinition>>,
}

impl DefinitionSlot {
    /// Create a slot at version 1
    pub fn new(name: impl Into<String>, definition: ParticleDefinition) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            version: AtomicU64::new(1),
            current: RwLock::new(Arc::new(definition)),
        })
    }

    /// Effect name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current version token
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Current definition together with its version
    pub fn snapshot(&self) -> (Arc<ParticleDefinition>, u64) {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&guard), self.version())
    }

    /// Current definition
    pub fn definition(&self) -> Arc<ParticleDefinition> {
        self.snapshot().0
    }

    /// Swap in a new definition and return the new version
    pub fn replace(&self, definition: ParticleDefinition) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(definition);
        // Bumped under the write lock so snapshots never pair old data with a new version
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Registry of effect definitions by name
#[derive(Debug, Default)]
pub struct DefinitionLibrary {
    slots: HashMap<String, Arc<DefinitionSlot>>,
}

impl DefinitionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a definition, replacing any previous slot of the same name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        definition: ParticleDefinition,
    ) -> Result<Arc<DefinitionSlot>> {
        definition.validate()?;
        let name = name.into();
        log::debug!("Registering particle definition '{name}'");
        let slot = DefinitionSlot::new(name.clone(), definition);
        self.slots.insert(name, Arc::clone(&slot));
        Ok(slot)
    }

    /// Slot registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<DefinitionSlot>> {
        self.slots.get(name).cloned()
    }

    /// Handle a "definition changed" signal
    ///
    /// The replacement is validated first; on failure the slot keeps serving
    /// the previous definition. Returns the new version.
    pub fn reload(&self, name: &str, definition: ParticleDefinition) -> Result<u64> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| ParticleError::UnknownDefinition(name.to_string()))?;
        definition.validate()?;
        let version = slot.replace(definition);
        log::debug!("Reloaded particle definition '{name}' (version {version})");
        Ok(version)
    }

    /// Drop a definition; running instances keep their last snapshot
    pub fn remove(&mut self, name: &str) -> Option<Arc<DefinitionSlot>> {
        self.slots.remove(name)
    }

    /// Registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_bumps_version() {
        let slot = DefinitionSlot::new("smoke", ParticleDefinition::default());
        assert_eq!(slot.version(), 1);

        let mut def = ParticleDefinition::default();
        def.system.max_particles = 7;
        assert_eq!(slot.replace(def), 2);

        let (current, version) = slot.snapshot();
        assert_eq!(version, 2);
        assert_eq!(current.system.max_particles, 7);
    }

    #[test]
    fn test_reload_preserves_slot_identity() {
        let mut library = DefinitionLibrary::new();
        let slot = library
            .insert("sparks", ParticleDefinition::default())
            .unwrap();

        library
            .reload("sparks", ParticleDefinition::default())
            .unwrap();

        let again = library.get("sparks").unwrap();
        assert!(Arc::ptr_eq(&slot, &again));
        assert_eq!(again.version(), 2);
    }

    #[test]
    fn test_reload_rejects_invalid() {
        let mut library = DefinitionLibrary::new();
        library.insert("fire", ParticleDefinition::default()).unwrap();

        let mut bad = ParticleDefinition::default();
        bad.system.max_particles = 0;
        assert!(library.reload("fire", bad).is_err());
        assert_eq!(library.get("fire").unwrap().version(), 1);
    }

    #[test]
    fn test_reload_unknown_name() {
        let library = DefinitionLibrary::new();
        assert_eq!(
            library.reload("missing", ParticleDefinition::default()),
            Err(ParticleError::UnknownDefinition("missing".to_string()))
        );
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let mut library = DefinitionLibrary::new();
        let mut bad = ParticleDefinition::default();
        bad.renderer.num_frames = 0;
        assert!(library.insert("bad", bad).is_err());
        assert!(library.is_empty());
    }
}
