//! Named type registry.
//!
//! Aliases are resolved by name each time a value passes through an alias
//! node, never expanded eagerly, so mutually-recursive registrations
//! (A references B references A) are fine.

use std::collections::HashMap;

use super::types::TypeDesc;

/// Name-to-descriptor table consulted for alias resolution.
///
/// Immutable after initialization: register every named type before the
/// first check, then share the registry freely.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDesc>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type, replacing any previous registration
    pub fn register(&mut self, name: impl Into<String>, desc: TypeDesc) {
        self.types.insert(name.into(), desc);
    }

    /// Look up a type by name
    pub fn lookup(&self, name: &str) -> Option<&TypeDesc> {
        self.types.get(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
