use thiserror::Error;

/// Returned by [`HashMap::at`](crate::HashMap::at) when the requested key is
/// not stored in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key not found in map")]
pub struct KeyNotFound;

/// Rejected [`TableConfig`](crate::TableConfig) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The starting capacity must hold at least one slot.
    #[error("initial capacity must be non-zero")]
    ZeroCapacity,
    /// The maximum load factor must lie strictly between 0 and 1.
    #[error("max load factor {0} is outside of (0, 1)")]
    LoadFactorOutOfRange(f64),
}
