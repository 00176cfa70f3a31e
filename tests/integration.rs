//! End-to-end scenarios exercised against the public façade.

use tagmap::config::{BucketCountFamily, TableConfig};
use tagmap::TagMap;

#[test]
fn insert_find_round_trip() {
    let mut map: TagMap<String, i32> = TagMap::new();
    assert_eq!(map.insert("alpha".into(), 1), None);
    assert_eq!(map.get(&"alpha".into()), Some(&1));
}

#[test]
fn remove_find_round_trip() {
    let mut map: TagMap<String, i32> = TagMap::new();
    map.insert("alpha".into(), 1);
    assert_eq!(map.remove(&"alpha".into()), Some(1));
    assert_eq!(map.get(&"alpha".into()), None);
}

#[test]
fn overwrite_semantics_return_old_value_and_keep_count() {
    let mut map: TagMap<i32, i32> = TagMap::new();
    assert_eq!(map.insert(1, 100), None);
    assert_eq!(map.insert(1, 200), Some(100));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&200));
}

#[test]
fn growth_preserves_every_key() {
    let _subscriber = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut map: TagMap<u32, u32> = TagMap::with_capacity(1);
    for i in 0..2000 {
        map.insert(i, i.wrapping_mul(7));
    }
    assert_eq!(map.len(), 2000);
    for i in 0..2000 {
        assert_eq!(map.get(&i), Some(&i.wrapping_mul(7)));
    }
}

#[test]
fn iteration_visits_each_occupied_pair_exactly_once() {
    let mut map: TagMap<u32, u32> = TagMap::new();
    for i in 0..500 {
        map.insert(i, i);
    }
    let mut seen: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 500);
}

#[test]
fn empty_table_find_returns_none_immediately() {
    let map: TagMap<u32, u32> = TagMap::new();
    assert_eq!(map.get(&0), None);
    assert_eq!(map.len(), 0);
}

#[test]
fn power_of_two_family_round_trips_same_as_prime() {
    let mut map: TagMap<u32, u32> =
        TagMap::with_config_and_capacity(
            TableConfig {
                bucket_count_family: BucketCountFamily::PowerOfTwo,
                ..TableConfig::default()
            },
            0,
        )
        .unwrap();
    for i in 0..1000 {
        map.insert(i, i * 3);
    }
    for i in 0..1000 {
        assert_eq!(map.get(&i), Some(&(i * 3)));
    }
}

/// A `BuildHasher` that collapses every key to the same hash, forcing every
/// insert into the same home bucket so the cascade mechanism is exercised
/// on every probe (§8 scenario 4: "hash-collision stress").
#[derive(Default, Clone, Copy)]
struct ZeroHasher;

struct ZeroHasherImpl;

impl std::hash::Hasher for ZeroHasherImpl {
    fn finish(&self) -> u64 {
        0
    }
    fn write(&mut self, _bytes: &[u8]) {}
}

impl std::hash::BuildHasher for ZeroHasher {
    type Hasher = ZeroHasherImpl;
    fn build_hasher(&self) -> Self::Hasher {
        ZeroHasherImpl
    }
}

#[test]
fn hash_collision_stress_keeps_every_key_findable() {
    let mut map: TagMap<i32, i32, ZeroHasher> = TagMap::with_hasher(ZeroHasher).unwrap();
    map.ensure_capacity(30);
    for k in 0..30 {
        assert!(map.insert_new(k, k * 10));
    }
    for k in 0..30 {
        assert_eq!(map.get(&k), Some(&(k * 10)));
    }

    // Remove one of the displaced keys; the remaining 29 must still be
    // reachable even though they all share one home bucket.
    assert_eq!(map.remove(&15), Some(150));
    assert_eq!(map.get(&15), None);
    for k in 0..30 {
        if k != 15 {
            assert_eq!(map.get(&k), Some(&(k * 10)));
        }
    }
    assert_eq!(map.len(), 29);

    // Removing everything else must leave no trace behind.
    for k in 0..30 {
        if k != 15 {
            assert_eq!(map.remove(&k), Some(k * 10));
        }
    }
    assert_eq!(map.len(), 0);
}

#[test]
fn rehash_determinism_same_sequence_same_key_set() {
    let seq: Vec<u32> = (0..1000).map(|i| (i * 2654435761u32) ^ i).collect();

    let mut a: TagMap<u32, u32> = TagMap::new();
    let mut b: TagMap<u32, u32> = TagMap::new();
    for &k in &seq {
        a.insert(k, k);
        b.insert(k, k);
    }

    let mut from_a: Vec<u32> = a.iter().map(|(k, _)| *k).collect();
    let mut from_b: Vec<u32> = b.iter().map(|(k, _)| *k).collect();
    from_a.sort_unstable();
    from_b.sort_unstable();
    assert_eq!(from_a, from_b);
    assert_eq!(a.len(), b.len());
}

#[test]
fn alternate_lookup_by_str_against_string_keyed_map() {
    use std::hash::{BuildHasher, Hash, Hasher};
    use tagmap::DefaultHashBuilder;

    let mut map: TagMap<String, i32> = TagMap::new();
    map.insert("hello".to_string(), 42);
    map.insert("world".to_string(), 7);

    let hash_builder = DefaultHashBuilder::default();
    let view = map.alternate_lookup(
        |q: &str| {
            let mut h = hash_builder.build_hasher();
            q.hash(&mut h);
            h.finish()
        },
        |k: &String, q: &str| k.as_str() == q,
    );
    assert_eq!(view.get("hello"), Some(&42));
    assert_eq!(view.get("nope"), None);
}
