//! Configuration for decoding and synchronization
//!
//! This module provides the `Config` type and re-exports the time, range and
//! box primitives from the `tempus-types` crate for convenience.
use serde::de::Error;

pub use tempus_types::bbox::{BoundingBox, BoundingBox2D, STBox, TBox};
pub use tempus_types::period::Period;
pub use tempus_types::period_set::PeriodSet;
pub use tempus_types::range::ValueRange;
pub use tempus_types::time::Timestamp;
pub use tempus_types::timestamp_set::TimestampSet;

/// Library configuration
///
/// # Example
///
/// ```rust
/// use tempus::Config;
///
/// let config = Config::from_json(r#"{ "max_sequences": 64, "crossings": false }"#)?;
/// assert_eq!(config.max_sequences, 64);
/// assert!(!config.crossings);
/// assert_eq!(config.max_instants, Config::default().max_instants);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upper bound on the sequence count accepted when decoding
    #[serde(default = "Config::default_max_sequences")]
    pub max_sequences: usize,

    /// Upper bound on the instant count of a single decoded sequence
    #[serde(default = "Config::default_max_instants")]
    pub max_instants: usize,

    /// Materialize crossing instants when synchronizing linear values
    #[serde(default = "Config::default_crossings")]
    pub crossings: bool,
}

impl Config {
    const fn default_max_sequences() -> usize {
        1 << 20
    }

    const fn default_max_instants() -> usize {
        1 << 24
    }

    const fn default_crossings() -> bool {
        true
    }

    pub fn with_max_sequences(mut self, max: usize) -> Self {
        assert!(max > 0, "Sequence limit must be greater than zero");

        if max > 1 << 24 {
            log::warn!(
                "Sequence limit of {} is very large; a hostile input may allocate \
                that many sequences before validation",
                max
            );
        }

        self.max_sequences = max;
        self
    }

    pub fn with_max_instants(mut self, max: usize) -> Self {
        assert!(max > 0, "Instant limit must be greater than zero");

        if max > 1 << 28 {
            log::warn!(
                "Instant limit of {} is very large and may consume significant memory",
                max
            );
        }

        self.max_instants = max;
        self
    }

    pub fn with_crossings(mut self, crossings: bool) -> Self {
        self.crossings = crossings;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_sequences == 0 {
            return Err("Sequence limit must be greater than zero".to_string());
        }

        if self.max_instants == 0 {
            return Err("Instant limit must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_sequences: Self::default_max_sequences(),
            max_instants: Self::default_max_instants(),
            crossings: Self::default_crossings(),
        }
    }
}
