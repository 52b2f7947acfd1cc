// src/utils/constants_config.rs
use log::warn;
use crate::utils::{
    DEFAULT_MULTIPOLE_CONFIG,
    MAX_USEFUL_PRECISION,
    errors::MultipoleError
};

/// Tunables for one tree: leaf capacity, number of multipole terms and the
/// squared distance at which the near-field law starts clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultipoleConfig {
    pub bucket_size: usize,
    pub precision: usize,
    pub near_field_threshold: f64,
}

impl Default for MultipoleConfig {
    fn default() -> Self {
        DEFAULT_MULTIPOLE_CONFIG
    }
}

impl MultipoleConfig {
    /// Creates a configuration, falling back to the defaults for every `None`.
    ///
    /// # Example
    /// ```
    /// use rs_multipole::utils::MultipoleConfig;
    ///
    /// let config = MultipoleConfig::new(Some(1), None, None);
    /// assert_eq!(config.bucket_size, 1);
    /// assert_eq!(config.precision, 5);
    /// assert_eq!(config.near_field_threshold, 0.1);
    /// ```
    pub fn new(
        bucket_size: Option<usize>,
        precision: Option<usize>,
        near_field_threshold: Option<f64>,
    ) -> Self {
        let default = DEFAULT_MULTIPOLE_CONFIG;
        Self {
            bucket_size: bucket_size.unwrap_or(default.bucket_size),
            precision: precision.unwrap_or(default.precision),
            near_field_threshold: near_field_threshold.unwrap_or(default.near_field_threshold),
        }
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    /// Returns the first offending field as a [`MultipoleError`].
    pub fn validate(&self) -> Result<(), MultipoleError> {
        if self.bucket_size == 0 { return Err(MultipoleError::InvalidBucketSize(self.bucket_size)); }
        if self.precision == 0 { return Err(MultipoleError::InvalidPrecision(self.precision)); }
        if !(self.near_field_threshold.is_finite() && self.near_field_threshold > 0.0) {
            return Err(MultipoleError::InvalidThreshold(self.near_field_threshold));
        }
        if self.precision > MAX_USEFUL_PRECISION {
            warn!("Precision {} exceeds {}; extra terms only add rounding noise.", self.precision, MAX_USEFUL_PRECISION);
        }
        Ok(())
    }
}
