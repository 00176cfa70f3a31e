use thiserror::Error;

/// Recoverable configuration failures.
///
/// Every other outcome in this crate's hot path (key not found, key already
/// present, table full) is modeled as a plain return value rather than an
/// error, since those are routine and checked on every call. `ConfigError`
/// is reserved for the one case that is a genuine caller mistake: a
/// `TableConfig` whose knobs can't be satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("oversize_percent must be >= 100, got {0}")]
    OversizeTooSmall(u32),
    #[error("bucket_pair_count must be in 1..=14, got {0}")]
    PairCountOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
