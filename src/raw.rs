//! The unsafe core (§4.4–§4.7): `RawTable<K, V>` owns the bucket array and
//! implements find/insert/remove/growth directly against it. [`crate::TagMap`]
//! is the safe façade that owns the `BuildHasher` and calls into this.

use std::hash::{BuildHasher, Hash};

use crate::bucket::{Bucket, PAIR_COUNT};
use crate::config::TableConfig;
use crate::error::Result;
use crate::hash::{make_hash, maybe_avalanche, suffix};
use crate::indexer::BucketIndexer;
use crate::probe::ProbeWalker;
use crate::simd::scan_suffix;

/// How `insert` should treat a key that's already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Fail with `AlreadyPresent` if the key is already in the table.
    EnsureUnique,
    /// Replace the value if the key is already present.
    OverwriteValue,
    /// Skip the uniqueness scan entirely. Only correct when the caller
    /// already knows every key being (re)inserted is unique in the
    /// destination table, as is the case while rehashing after growth.
    Rehashing,
}

/// Outcome of an `insert` call.
#[derive(Debug)]
pub enum InsertResult<V> {
    AddedNew,
    OverwroteExisting(V),
    AlreadyPresent,
    /// `count >= grow_at`: the caller must grow the table and retry.
    NeedToGrow,
    /// Every bucket was probed and none had room, despite `count < grow_at`.
    /// Unreachable under maintained invariants.
    CorruptedInternalState,
}

pub struct RawTable<K, V> {
    buckets: Vec<Bucket<K, V>>,
    indexer: BucketIndexer,
    config: TableConfig,
    count: usize,
    grow_at: usize,
}

impl<K, V> RawTable<K, V> {
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_capacity(config, 0)
    }

    pub fn with_capacity(config: TableConfig, capacity: usize) -> Result<Self> {
        config.validate()?;
        let requested_buckets = (config.oversize(capacity) + PAIR_COUNT - 1) / PAIR_COUNT;
        let indexer = BucketIndexer::new(config.bucket_count_family, requested_buckets);
        let bucket_count = indexer.bucket_count();
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Bucket::empty);
        let grow_at = bucket_count * PAIR_COUNT;
        Ok(Self {
            buckets,
            indexer,
            config,
            count: 0,
            grow_at,
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.grow_at
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn origin(&self) -> usize {
        self.buckets.as_ptr() as usize
    }

    /// Hashes `key` with the table's configured avalanche policy.
    #[inline]
    pub(crate) fn hash_of<Q: Hash + ?Sized>(&self, hash_builder: &impl BuildHasher, key: &Q) -> u64 {
        maybe_avalanche(make_hash(hash_builder, key), self.config.avalanche_mix)
    }

    /// Whether this table's hashes get the avalanche finalizer applied
    /// (§4.1). `AlternateLookup` needs this to mix a foreign key's hash the
    /// same way `hash_of` mixes a stored key's, since only the comparer —
    /// not the mixing step — is supposed to differ per §4.9.
    #[inline]
    pub(crate) fn avalanche_mix(&self) -> bool {
        self.config.avalanche_mix
    }

    /// Walks the probe sequence for `hash`, calling `eq` against every
    /// suffix-matching candidate, terminating early at the first bucket
    /// whose cascade count is zero (§4.4).
    pub fn find(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Option<&(K, V)> {
        if self.buckets.is_empty() {
            return None;
        }
        let target = suffix(hash, self.config.bucket_count_family);
        let initial = self.indexer.initial_bucket(hash);
        let mut walker = ProbeWalker::new(initial, self.buckets.len(), self.origin());
        loop {
            let bucket = &self.buckets[walker.bucket()];
            for slot in scan_suffix(&bucket.tags, target) {
                if slot < bucket.count() && eq(&bucket.pair_at(slot).0) {
                    return Some(bucket.pair_at(slot));
                }
            }
            if bucket.cascade() == 0 {
                return None;
            }
            if !walker.advance() {
                return None;
            }
        }
    }

    /// Finds the nearest bucket along the probe path from `initial` with a
    /// free slot, without the cascade-zero early exit `find` uses — a free
    /// slot can exist past a bucket whose cascade happens to read zero.
    fn find_insertion_slot(&self, initial: usize) -> Option<usize> {
        let mut walker = ProbeWalker::new(initial, self.buckets.len(), self.origin());
        loop {
            if self.buckets[walker.bucket()].count() < PAIR_COUNT {
                return Some(walker.bucket());
            }
            if !walker.advance() {
                return None;
            }
        }
    }

    /// Bumps the cascade counter of every bucket between `initial`
    /// (inclusive) and `landing` (exclusive) — the buckets a pair homed at
    /// `initial` had to cascade through to reach `landing` (§4.5).
    fn bump_cascade_path(&mut self, initial: usize, landing: usize) {
        let origin = self.origin();
        let bucket_count = self.buckets.len();
        let mut walker = ProbeWalker::new_at(initial, landing, bucket_count, origin);
        while walker.retreat(origin) {
            let bucket_idx = walker.bucket();
            let was_degraded = self.buckets[bucket_idx].is_cascade_degraded();
            self.buckets[bucket_idx].bump_cascade();
            if !was_degraded && self.buckets[bucket_idx].is_cascade_degraded() {
                tracing::warn!(
                    bucket = bucket_idx,
                    "bucket cascade count saturated at 255; probes through it can no longer \
                     terminate early"
                );
            }
        }
    }

    /// Inverse of [`Self::bump_cascade_path`], used by `remove`.
    fn unbump_cascade_path(&mut self, initial: usize, landing: usize) {
        let origin = self.origin();
        let bucket_count = self.buckets.len();
        let mut walker = ProbeWalker::new_at(initial, landing, bucket_count, origin);
        while walker.retreat(origin) {
            self.buckets[walker.bucket()].unbump_cascade();
        }
    }

    /// Core of `insert`/rehash-reinsert, given an already-computed hash.
    fn insert_hashed(&mut self, hash: u64, key: K, value: V, mode: InsertMode) -> InsertResult<V>
    where
        K: Eq,
    {
        if self.count >= self.grow_at {
            return InsertResult::NeedToGrow;
        }

        let initial = self.indexer.initial_bucket(hash);

        if mode != InsertMode::Rehashing {
            let target = suffix(hash, self.config.bucket_count_family);
            let origin = self.origin();
            let mut walker = ProbeWalker::new(initial, self.buckets.len(), origin);
            loop {
                let bucket = &self.buckets[walker.bucket()];
                let mut existing_slot = None;
                for slot in scan_suffix(&bucket.tags, target) {
                    if slot < bucket.count() && bucket.pair_at(slot).0 == key {
                        existing_slot = Some(slot);
                        break;
                    }
                }
                if let Some(slot) = existing_slot {
                    let bucket_idx = walker.bucket();
                    return match mode {
                        InsertMode::EnsureUnique => InsertResult::AlreadyPresent,
                        InsertMode::OverwriteValue => {
                            let old = self.buckets[bucket_idx].overwrite_value(slot, value);
                            InsertResult::OverwroteExisting(old)
                        }
                        InsertMode::Rehashing => unreachable!(),
                    };
                }
                if bucket.cascade() == 0 {
                    break;
                }
                if !walker.advance() {
                    break;
                }
            }
        }

        let landing = match self.find_insertion_slot(initial) {
            Some(b) => b,
            None => return InsertResult::CorruptedInternalState,
        };

        let target = suffix(hash, self.config.bucket_count_family);
        self.buckets[landing].insert_at_count(target, (key, value));
        self.count += 1;
        if landing != initial {
            self.bump_cascade_path(initial, landing);
        }
        InsertResult::AddedNew
    }

    pub fn insert(
        &mut self,
        hash_builder: &impl BuildHasher,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> InsertResult<V>
    where
        K: Hash + Eq,
    {
        let hash = self.hash_of(hash_builder, &key);
        self.insert_hashed(hash, key, value, mode)
    }

    /// Walks the probe path for `hash`, removing the first key matching
    /// `eq` (§4.6): rotate-back within the bucket, then undo the cascade
    /// bump on every bucket between the home bucket and the one the pair
    /// was found in.
    pub fn remove(&mut self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Option<(K, V)> {
        if self.buckets.is_empty() {
            return None;
        }
        let target = suffix(hash, self.config.bucket_count_family);
        let initial = self.indexer.initial_bucket(hash);
        let origin = self.origin();
        let mut walker = ProbeWalker::new(initial, self.buckets.len(), origin);
        loop {
            let landing = walker.bucket();
            let bucket = &self.buckets[landing];
            let mut found_slot = None;
            for slot in scan_suffix(&bucket.tags, target) {
                if slot < bucket.count() && eq(&bucket.pair_at(slot).0) {
                    found_slot = Some(slot);
                    break;
                }
            }
            if let Some(slot) = found_slot {
                let removed = self.buckets[landing].remove_at(slot);
                self.count -= 1;
                if landing != initial {
                    self.unbump_cascade_path(initial, landing);
                }
                return Some(removed);
            }
            if bucket.cascade() == 0 {
                return None;
            }
            if !walker.advance() {
                return None;
            }
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.buckets,
            bucket_idx: 0,
            slot_idx: 0,
        }
    }

    /// Grows the table so it can hold at least `caller_hint` elements,
    /// then reinserts every live pair via `Insert` in `Rehashing` mode
    /// (§4.7). Publishes the new bucket array before making it reachable
    /// through `self.indexer`/`self.grow_at` so a reader observing `self`
    /// mid-call under the single-writer model never sees a bucket array
    /// whose bound doesn't match the indexer it reads alongside it.
    pub fn grow(&mut self, hash_builder: &impl BuildHasher, caller_hint: usize)
    where
        K: Hash + Eq,
    {
        let target_capacity = (self.grow_at * 2).max(caller_hint);
        let oversized = self.config.oversize(target_capacity);
        let requested_buckets = (oversized + PAIR_COUNT - 1) / PAIR_COUNT;
        let new_indexer = BucketIndexer::new(self.config.bucket_count_family, requested_buckets);
        let new_bucket_count = new_indexer.bucket_count();

        tracing::trace!(
            old_buckets = self.buckets.len(),
            new_buckets = new_bucket_count,
            count = self.count,
            "growing table"
        );

        let mut new_buckets = Vec::with_capacity(new_bucket_count);
        new_buckets.resize_with(new_bucket_count, Bucket::empty);

        let mut old_buckets = std::mem::replace(&mut self.buckets, new_buckets);
        self.indexer = new_indexer;
        self.grow_at = new_bucket_count * PAIR_COUNT;
        self.count = 0;

        for bucket in &mut old_buckets {
            while bucket.count() > 0 {
                let (key, value) = bucket.remove_at(0);
                let hash = self.hash_of(hash_builder, &key);
                match self.insert_hashed(hash, key, value, InsertMode::Rehashing) {
                    InsertResult::AddedNew => {}
                    _ => unreachable!("rehash reinsertion must always add a new pair"),
                }
            }
        }
    }

    /// Grows (possibly more than once, in principle, though a single
    /// doubling oversized by `oversize_percent` always suffices) until
    /// `capacity() >= n`, then returns.
    pub fn ensure_capacity(&mut self, hash_builder: &impl BuildHasher, n: usize)
    where
        K: Hash + Eq,
    {
        if self.capacity() >= n {
            return;
        }
        self.grow(hash_builder, n);
    }
}

pub struct Iter<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    bucket_idx: usize,
    slot_idx: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.bucket_idx < self.buckets.len() {
            let bucket = &self.buckets[self.bucket_idx];
            if self.slot_idx < bucket.count() {
                let pair = bucket.pair_at(self.slot_idx);
                self.slot_idx += 1;
                return Some(pair);
            }
            self.bucket_idx += 1;
            self.slot_idx = 0;
        }
        None
    }
}
