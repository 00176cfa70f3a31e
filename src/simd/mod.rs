//! SIMD backend selection (§2.3, §4.2): whichever `Group` the target
//! supports, the rest of the table only ever calls [`scan_suffix`], which
//! also takes care of masking the two metadata lanes out of the result
//! (§4.2: "Matches in lanes 14 or 15 must never be returned").

mod bitmask;

cfg_if::cfg_if! {
    if #[cfg(all(
        target_feature = "sse2",
        any(target_arch = "x86", target_arch = "x86_64"),
        not(miri)
    ))] {
        mod sse2;
        use sse2 as imp;
    } else if #[cfg(all(target_arch = "aarch64", target_feature = "neon", not(miri)))] {
        mod neon;
        use neon as imp;
    } else if #[cfg(all(target_arch = "wasm32", target_feature = "simd128", not(miri)))] {
        mod wasm32;
        use wasm32 as imp;
    } else {
        #[path = "generic.rs"]
        mod generic;
        use generic as imp;
    }
}

pub(crate) use bitmask::BitMask;
use imp::Group;

use crate::bucket::PAIR_COUNT;

/// Bits `PAIR_COUNT..16` belong to the count/cascade metadata lanes, never
/// to a pair's suffix.
const DATA_MASK: u16 = (1u16 << PAIR_COUNT) - 1;

/// Scans a bucket's 16-byte tag lane for `target`, restricted to the first
/// `PAIR_COUNT` lanes. Equivalent to "the least lane index in `[0, 14)`
/// whose suffix equals `target`, or no match" from §4.2 — represented here
/// as a `BitMask` so callers can walk every match, not just the first, in
/// case of a suffix collision that fails the follow-up key-equality check.
#[inline]
pub(crate) fn scan_suffix(tags: &[u8; 16], target: u8) -> BitMask {
    let group = Group::load(tags);
    let raw = group.match_byte(target);
    BitMask(raw.0 & DATA_MASK)
}
