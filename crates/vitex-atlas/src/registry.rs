//! Texture Identity
//!
//! Stable integer identities for the logical objects tracked by the atlas.
//! Host-side handles (material pointers, asset GUIDs) are interned here once
//! and every other module keys on the resulting [`TextureId`].

use std::hash::Hash;

use ahash::AHashMap;

/// Stable identity for one texture-bearing logical object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u32);

impl TextureId {
    /// Create an id from a raw value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value of this id
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Two-way map between host keys and [`TextureId`]s.
///
/// Ids are assigned at first registration and stay stable until the key is
/// explicitly removed. Eviction is always explicit; nothing here is collected
/// behind the caller's back.
#[derive(Debug, Default)]
pub struct TextureRegistry<K> {
    forward: AHashMap<K, TextureId>,
    reverse: AHashMap<TextureId, K>,
    next_id: u32,
}

impl<K: Eq + Hash + Clone> TextureRegistry<K> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            forward: AHashMap::new(),
            reverse: AHashMap::new(),
            next_id: 0,
        }
    }

    /// Get the id for `key`, assigning a fresh one on first sight
    pub fn register(&mut self, key: K) -> TextureId {
        if let Some(&id) = self.forward.get(&key) {
            return id;
        }
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.forward.insert(key.clone(), id);
        self.reverse.insert(id, key);
        id
    }

    /// Look up the id for a key without registering it
    pub fn id_of(&self, key: &K) -> Option<TextureId> {
        self.forward.get(key).copied()
    }

    /// Look up the key for an id
    pub fn key_of(&self, id: TextureId) -> Option<&K> {
        self.reverse.get(&id)
    }

    /// Remove a key and its id. Returns whether the key was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.forward.remove(key) {
            Some(id) => {
                self.reverse.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Remove by id. Returns whether the id was present.
    pub fn remove_id(&mut self, id: TextureId) -> bool {
        match self.reverse.remove(&id) {
            Some(key) => {
                self.forward.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_stable() {
        let mut registry = TextureRegistry::new();
        let a = registry.register("brick_wall");
        let b = registry.register("rusty_metal");
        assert_ne!(a, b);
        assert_eq!(registry.register("brick_wall"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_two_way_lookup() {
        let mut registry = TextureRegistry::new();
        let id = registry.register(String::from("grass"));
        assert_eq!(registry.id_of(&String::from("grass")), Some(id));
        assert_eq!(registry.key_of(id).map(String::as_str), Some("grass"));
    }

    #[test]
    fn test_remove_clears_both_directions() {
        let mut registry = TextureRegistry::new();
        let id = registry.register("sand");
        assert!(registry.remove(&"sand"));
        assert_eq!(registry.id_of(&"sand"), None);
        assert_eq!(registry.key_of(id), None);
        assert!(!registry.remove(&"sand"));
        assert!(!registry.remove_id(id));
    }

    #[test]
    fn test_id_not_reused_after_remove() {
        let mut registry = TextureRegistry::new();
        let a = registry.register("a");
        registry.remove(&"a");
        let b = registry.register("a");
        assert_ne!(a, b);
    }
}
