use crate::error::{ConfigError, Result};

/// Which family of bucket counts a table is built with.
///
/// The design mandates exactly one choice per build: primes give better
/// collision resistance at the cost of a multiply-and-shift modulus;
/// powers of two make the modulus a single `AND`. Both are implemented;
/// callers pick one per `TableConfig` rather than per Cargo feature, since
/// nothing about the core forces a single global choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCountFamily {
    Prime,
    PowerOfTwo,
}

impl Default for BucketCountFamily {
    fn default() -> Self {
        // Matches the reference strategy: primes for B > 1.
        BucketCountFamily::Prime
    }
}

/// Build-time knobs for a [`crate::raw::RawTable`] / [`crate::TagMap`].
///
/// `bucket_pair_count` is accepted and validated for forward compatibility
/// with the reference design, but this crate only implements the reference
/// value of 14: varying the pair count per-instance would require a const
/// generic on every bucket and SIMD backend, which isn't worth the
/// complexity for a knob whose only legal value, per the 16-byte lane
/// constraint (`count` + `cascade` must share the lane with the tags),
/// is 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub bucket_count_family: BucketCountFamily,
    pub avalanche_mix: bool,
    pub oversize_percent: u32,
    pub bucket_pair_count: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bucket_count_family: BucketCountFamily::default(),
            avalanche_mix: false,
            oversize_percent: 120,
            bucket_pair_count: crate::bucket::PAIR_COUNT as u32,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        if self.oversize_percent < 100 {
            return Err(ConfigError::OversizeTooSmall(self.oversize_percent));
        }
        if self.bucket_pair_count == 0 || self.bucket_pair_count > crate::bucket::PAIR_COUNT as u32
        {
            return Err(ConfigError::PairCountOutOfRange(self.bucket_pair_count));
        }
        Ok(())
    }

    /// Scale a requested element capacity by `oversize_percent`.
    #[inline]
    pub(crate) fn oversize(&self, requested: usize) -> usize {
        // requested * oversize_percent / 100, guarding against overflow on
        // absurd requests rather than wrapping into a tiny table.
        requested
            .saturating_mul(self.oversize_percent as usize)
            .saturating_add(99)
            / 100
    }
}
