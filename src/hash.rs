//! Hash-fingerprint splitter (§4.1): turns a raw hash into the pieces the
//! rest of the table needs — an initial bucket index and an 8-bit non-zero
//! suffix — plus the optional avalanche finalizer used to harden
//! low-entropy hashes.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

use crate::bucket::EMPTY_TAG;
use crate::config::BucketCountFamily;

/// Default hasher. FxHash, same choice as the teacher crate this was
/// generalized from: most keys here are small integers or short strings,
/// where FxHash's multiply-rotate is both faster and adequate, unlike a
/// DoS-resistant SipHash which this crate doesn't need since keyed-hash
/// hardening is explicitly out of scope (see Non-goals).
pub type DefaultHashBuilder = BuildHasherDefault<fxhash::FxHasher>;

#[inline]
pub(crate) fn make_hash<K: Hash + ?Sized>(build_hasher: &impl BuildHasher, key: &K) -> u64 {
    let mut state = build_hasher.build_hasher();
    key.hash(&mut state);
    state.finish()
}

/// MurmurHash3's 32-bit finalizer, used when `avalanche_mix` is enabled to
/// harden hashes that don't already mix their low/high bits well (e.g. an
/// identity hash over small integers).
#[inline]
pub(crate) fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Applies the optional avalanche mix to a 64-bit hash by mixing each half
/// independently and recombining, so the result stays 64 bits wide for the
/// downstream bucket-index / suffix split.
#[inline]
pub(crate) fn maybe_avalanche(hash: u64, enabled: bool) -> u64 {
    if !enabled {
        return hash;
    }
    let lo = fmix32(hash as u32) as u64;
    let hi = fmix32((hash >> 32) as u32) as u64;
    (hi << 32) | lo
}

/// Extracts the 8-bit suffix from a (possibly avalanche-mixed) hash.
///
/// Per §4.1 the suffix must come from bits disjoint from the bucket index:
/// the reference takes the top byte for power-of-two bucket counts (whose
/// index comes from the low bits) and the low byte for prime bucket counts
/// (whose index comes from a fast-modulus reduction that draws on the full
/// width of the hash).
#[inline]
pub(crate) fn suffix(hash: u64, family: BucketCountFamily) -> u8 {
    let raw = match family {
        BucketCountFamily::PowerOfTwo => (hash >> 56) as u8,
        BucketCountFamily::Prime => hash as u8,
    };
    if raw == EMPTY_TAG {
        255
    } else {
        raw
    }
}
