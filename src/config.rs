use crate::error::ConfigError;

/// Sizing parameters for a [`HashTable`](crate::HashTable) or
/// [`HashMap`](crate::HashMap).
///
/// A table starts with `initial_capacity` slots and doubles whenever an insert
/// leaves more than `floor(capacity * max_load_factor)` entries behind. The
/// defaults are a capacity of 4 and a load factor of 0.42.
///
/// # Examples
///
/// ```rust
/// use robin_map::TableConfig;
///
/// let config = TableConfig::new(16, 0.5).unwrap();
/// assert_eq!(config.initial_capacity(), 16);
/// assert_eq!(config.max_len_for(16), 8);
///
/// assert!(TableConfig::new(0, 0.5).is_err());
/// assert!(TableConfig::new(16, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    initial_capacity: usize,
    max_load_factor: f64,
}

impl TableConfig {
    /// Four slots, growing once more than 42% of them are occupied.
    pub const DEFAULT: Self = Self {
        initial_capacity: 4,
        max_load_factor: 0.42,
    };

    /// Creates a validated configuration.
    ///
    /// `max_load_factor` must be strictly between 0 and 1 so that every table
    /// keeps at least one empty slot to terminate its probe runs.
    pub fn new(initial_capacity: usize, max_load_factor: f64) -> Result<Self, ConfigError> {
        if initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        // Written so that NaN is rejected as well.
        if !(max_load_factor > 0.0 && max_load_factor < 1.0) {
            return Err(ConfigError::LoadFactorOutOfRange(max_load_factor));
        }
        Ok(Self {
            initial_capacity,
            max_load_factor,
        })
    }

    /// Number of slots a freshly created or cleared table allocates.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Fraction of slots that may be occupied once an insert returns.
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Largest entry count a table of `capacity` slots may hold without
    /// growing, i.e. `floor(capacity * max_load_factor)`.
    #[inline]
    pub fn max_len_for(&self, capacity: usize) -> usize {
        (capacity as f64 * self.max_load_factor) as usize
    }

    /// Smallest capacity reachable by doubling `capacity` that can hold `len`
    /// entries.
    pub(crate) fn grown_capacity(&self, capacity: usize, len: usize) -> usize {
        let mut capacity = capacity;
        while len > self.max_len_for(capacity) {
            capacity *= 2;
        }
        capacity
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
