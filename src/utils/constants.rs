use crate::utils;

/// Squared distance below which two particles are treated as coincident.
pub const DEFAULT_NEAR_FIELD_THRESHOLD: f64 = 0.1;

/// Unit direction used to separate particles that sit exactly on top of each other.
pub const COINCIDENT_DIRECTION: (f64, f64) = (1.0, 0.0);

/// Relative slack used by the disc containment and separation tests.
pub const DISC_TOLERANCE: f64 = 1e-9;

/// Precisions above this are legal but numerically pointless for f64 coefficients.
pub const MAX_USEFUL_PRECISION: usize = 32;

pub const DEFAULT_MULTIPOLE_CONFIG: utils::MultipoleConfig = utils::MultipoleConfig {
    bucket_size: 4,
    precision: 5,
    near_field_threshold: DEFAULT_NEAR_FIELD_THRESHOLD,
};
