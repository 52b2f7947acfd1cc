use std::fmt;
use std::error::Error;

/// Represents errors that can occur while building or evaluating a multipole tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipoleError {
    /// The minimum enclosing disc was requested for zero points.
    EmptyPointSet,
    /// A tree was requested over zero particles.
    EmptyParticleSet,
    /// The particle at this index has a NaN or infinite coordinate.
    NonFinitePosition(usize),
    /// Leaves must be allowed to hold at least one particle.
    InvalidBucketSize(usize),
    /// A multipole expansion needs at least one term.
    InvalidPrecision(usize),
    /// The near-field clamping threshold must be positive and finite.
    InvalidThreshold(f64),
    /// Three boundary points handed to the circumcircle construction lie on one line.
    CollinearBoundaryPoints,
    /// Two coefficient sets of different precision were combined.
    PrecisionMismatch { left: usize, right: usize },
    /// The particle slice passed to an evaluation differs in length from the one the tree was built over.
    ParticleCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for MultipoleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MultipoleError::EmptyPointSet => write!(f, "Cannot enclose an empty point set"),
            MultipoleError::EmptyParticleSet => write!(f, "Cannot build a tree over an empty particle set"),
            MultipoleError::NonFinitePosition(index) => write!(f, "Particle {} has a non-finite position", index),
            MultipoleError::InvalidBucketSize(size) => write!(f, "Invalid bucket size: {}", size),
            MultipoleError::InvalidPrecision(precision) => write!(f, "Invalid precision: {}", precision),
            MultipoleError::InvalidThreshold(threshold) => write!(f, "Invalid near-field threshold: {}", threshold),
            MultipoleError::CollinearBoundaryPoints => write!(f, "Boundary points of a disc are collinear"),
            MultipoleError::PrecisionMismatch { left, right } => {
                write!(f, "Cannot combine coefficients of precision {} and {}", left, right)
            }
            MultipoleError::ParticleCountMismatch { expected, actual } => {
                write!(f, "Tree was built over {} particles but {} were supplied", expected, actual)
            }
        }
    }
}

impl Error for MultipoleError {}
