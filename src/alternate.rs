//! Alternate lookup (§4.9): find by a foreign key type without constructing
//! a `K`, e.g. looking a `TagMap<String, V>` up by `&str`. Read-only — no
//! mutation is exposed through this view.

use std::marker::PhantomData;

use crate::hash::maybe_avalanche;
use crate::raw::RawTable;

/// A comparer-parameterized read-only view over a [`RawTable`].
///
/// `H` hashes the foreign query type `Q` the same way the table's own
/// `BuildHasher` would hash a `K` that compares equal to it; `E` checks that
/// equality. Both are supplied by the caller since there's no blanket way
/// to derive them generically (a `Borrow<Q>` bound ties hashing and
/// equality together in a way this crate doesn't assume).
pub struct AlternateLookup<'a, K, V, Q: ?Sized, H, E> {
    table: &'a RawTable<K, V>,
    hash_fn: H,
    eq_fn: E,
    _marker: PhantomData<fn(&Q)>,
}

impl<'a, K, V, Q, H, E> AlternateLookup<'a, K, V, Q, H, E>
where
    Q: ?Sized,
    H: Fn(&Q) -> u64,
    E: Fn(&K, &Q) -> bool,
{
    pub(crate) fn new(table: &'a RawTable<K, V>, hash_fn: H, eq_fn: E) -> Self {
        Self {
            table,
            hash_fn,
            eq_fn,
            _marker: PhantomData,
        }
    }

    /// Looks up `query`, proceeding exactly as `RawTable::find` does, with
    /// the foreign hash/equality substituted at suffix derivation and key
    /// comparison. Only the comparer differs from an ordinary lookup — the
    /// hash still goes through the table's configured avalanche mix
    /// (§4.1), the same as `RawTable::hash_of` applies for a stored `K`,
    /// so a table built with `avalanche_mix: true` doesn't probe the wrong
    /// bucket for an otherwise-present key.
    pub fn get(&self, query: &Q) -> Option<&V> {
        let hash = maybe_avalanche((self.hash_fn)(query), self.table.avalanche_mix());
        self.table
            .find(hash, |k| (self.eq_fn)(k, query))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, query: &Q) -> bool {
        self.get(query).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::hash::DefaultHashBuilder;
    use crate::raw::InsertMode;
    use std::hash::{BuildHasher, Hash, Hasher};

    fn hash_str(s: &str, b: &DefaultHashBuilder) -> u64 {
        let mut h = b.build_hasher();
        s.hash(&mut h);
        h.finish()
    }

    #[test]
    fn alternate_lookup_finds_by_foreign_type() {
        let hasher = DefaultHashBuilder::default();
        let mut table: RawTable<String, i32> =
            RawTable::with_capacity(TableConfig::default(), 8).unwrap();
        table.insert(&hasher, "hello".to_string(), 1, InsertMode::EnsureUnique);

        let view = AlternateLookup::new(
            &table,
            |q: &str| hash_str(q, &hasher),
            |k: &String, q: &str| k.as_str() == q,
        );
        assert_eq!(view.get("hello"), Some(&1));
        assert_eq!(view.get("missing"), None);
        assert!(view.contains("hello"));
    }

    /// With `avalanche_mix: true`, a stored key's home bucket/suffix come
    /// from the *mixed* hash (`RawTable::hash_of`). `AlternateLookup::get`
    /// must mix the foreign key's hash the same way, or it probes the
    /// wrong bucket for a key that's actually present.
    #[test]
    fn alternate_lookup_respects_avalanche_mix() {
        let hasher = DefaultHashBuilder::default();
        let config = TableConfig {
            avalanche_mix: true,
            ..TableConfig::default()
        };
        let mut table: RawTable<String, i32> = RawTable::with_capacity(config, 8).unwrap();
        table.insert(&hasher, "hello".to_string(), 1, InsertMode::EnsureUnique);

        let view = AlternateLookup::new(
            &table,
            |q: &str| hash_str(q, &hasher),
            |k: &String, q: &str| k.as_str() == q,
        );
        assert_eq!(view.get("hello"), Some(&1));
        assert_eq!(view.get("missing"), None);
    }
}
