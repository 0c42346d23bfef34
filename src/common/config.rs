//! Configuration for the index.
//!
//! # Environment Variables
//!
//! - `BPLUS_CAPACITY`: maximum keys per node (default: `4`, minimum: `3`)

use crate::common::{Error, Result};

/// Smallest node capacity that still leaves at least one key on each side of a split.
///
/// A node splits as soon as it holds `capacity` keys, at `mid = capacity / 2`.
/// With capacity 2 an internal split would promote its only right-hand key
/// and leave the right sibling empty.
pub const MIN_CAPACITY: usize = 3;

/// Capacity used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 4;

/// Environment variable consulted by [`IndexConfig::from_env`].
pub const CAPACITY_ENV_VAR: &str = "BPLUS_CAPACITY";

/// Index construction parameters.
///
/// Holding an `IndexConfig` means the capacity has already been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    capacity: usize,
}

impl IndexConfig {
    /// Create a config with the given node capacity.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `capacity < MIN_CAPACITY`
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_CAPACITY {
            return Err(Error::InvalidConfiguration {
                capacity,
                minimum: MIN_CAPACITY,
            });
        }
        Ok(Self { capacity })
    }

    /// Load the config from `BPLUS_CAPACITY`, falling back to the default.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if the variable is set but not a number
    /// - `Error::InvalidConfiguration` if the number is below `MIN_CAPACITY`
    pub fn from_env() -> Result<Self> {
        Self::parse_capacity(std::env::var(CAPACITY_ENV_VAR).ok().as_deref())
    }

    fn parse_capacity(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => {
                let capacity = value.parse::<usize>().map_err(|_| {
                    Error::InvalidArgument(format!(
                        "{CAPACITY_ENV_VAR} must be a positive integer, got `{value}`"
                    ))
                })?;
                Self::new(capacity)
            }
        }
    }

    /// Maximum number of keys a node may hold before it must split.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
