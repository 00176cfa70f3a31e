//! The public façade (§6, §B.1): a safe, ergonomic map wrapping
//! [`crate::raw::RawTable`] plus a `BuildHasher`. This is the "wrapping
//! collection interface" the core itself doesn't implement — no throwing
//! indexers, no enumeration adapters beyond a plain iterator, no
//! serialization.

use std::hash::{BuildHasher, Hash};

use crate::alternate::AlternateLookup;
use crate::config::TableConfig;
use crate::error::Result;
use crate::hash::DefaultHashBuilder;
use crate::raw::{InsertMode, InsertResult, Iter, RawTable};

pub struct TagMap<K, V, S = DefaultHashBuilder> {
    raw: RawTable<K, V>,
    hash_builder: S,
}

impl<K, V> TagMap<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config_and_capacity(TableConfig::default(), capacity)
            .expect("default configuration is always valid")
    }
}

impl<K, V> Default for TagMap<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: BuildHasher + Default> TagMap<K, V, S> {
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_capacity(config, 0)
    }

    pub fn with_config_and_capacity(config: TableConfig, capacity: usize) -> Result<Self> {
        Ok(Self {
            raw: RawTable::with_capacity(config, capacity)?,
            hash_builder: S::default(),
        })
    }
}

impl<K, V, S: BuildHasher> TagMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Result<Self> {
        Ok(Self {
            raw: RawTable::with_capacity(TableConfig::default(), 0)?,
            hash_builder,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.raw.iter()
    }

    pub fn alternate_lookup<'a, Q: ?Sized, H, E>(
        &'a self,
        hash_fn: H,
        eq_fn: E,
    ) -> AlternateLookup<'a, K, V, Q, H, E>
    where
        H: Fn(&Q) -> u64,
        E: Fn(&K, &Q) -> bool,
    {
        AlternateLookup::new(&self.raw, hash_fn, eq_fn)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> TagMap<K, V, S> {
    pub fn ensure_capacity(&mut self, n: usize) {
        self.raw.ensure_capacity(&self.hash_builder, n);
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.raw.hash_of(&self.hash_builder, key);
        self.raw.find(hash, |k| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Grows ahead of the next insert if the table is already at
    /// `grow_at`, so a caller's `key`/`value` are never consumed by a
    /// `RawTable::insert` call that turns out to just return `NeedToGrow`.
    fn grow_if_full(&mut self) {
        if self.raw.count() >= self.raw.capacity() {
            self.raw.grow(&self.hash_builder, self.raw.count() + 1);
        }
    }

    /// Inserts `key`/`value`, overwriting and returning the prior value if
    /// `key` was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.grow_if_full();
        match self.raw.insert(&self.hash_builder, key, value, InsertMode::OverwriteValue) {
            InsertResult::AddedNew => None,
            InsertResult::OverwroteExisting(old) => Some(old),
            InsertResult::NeedToGrow => unreachable!("grow_if_full just ensured headroom"),
            InsertResult::AlreadyPresent | InsertResult::CorruptedInternalState => {
                unreachable!("OverwriteValue mode never returns this result")
            }
        }
    }

    /// Inserts `key`/`value` only if `key` is not already present. Returns
    /// `false` without modifying the map if it was.
    pub fn insert_new(&mut self, key: K, value: V) -> bool {
        self.grow_if_full();
        match self.raw.insert(&self.hash_builder, key, value, InsertMode::EnsureUnique) {
            InsertResult::AddedNew => true,
            InsertResult::AlreadyPresent => false,
            InsertResult::NeedToGrow => unreachable!("grow_if_full just ensured headroom"),
            InsertResult::OverwroteExisting(_) | InsertResult::CorruptedInternalState => {
                unreachable!("EnsureUnique mode never returns this result")
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.raw.hash_of(&self.hash_builder, key);
        self.raw.remove(hash, |k| k == key).map(|(_, v)| v)
    }
}
