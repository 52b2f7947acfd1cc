use log::debug;
use crate::models::{Particle, Vector2D};
use crate::utils::{MultipoleError, COINCIDENT_DIRECTION, DEFAULT_NEAR_FIELD_THRESHOLD};

/// Exact inverse-distance repulsion between two particles, clamped at short range.
///
/// `force(u, v)` is the push `u` exerts on `v`: `(v - u) / |v - u|^2`. Below a
/// squared distance of `threshold` the magnitude is held at `1 / threshold`
/// along the separation, or along a fixed axis for exactly coincident points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceLaw {
    threshold: f64,
}

impl Default for ForceLaw {
    fn default() -> Self {
        ForceLaw { threshold: DEFAULT_NEAR_FIELD_THRESHOLD }
    }
}

impl ForceLaw {
    /// # Errors
    /// [`MultipoleError::InvalidThreshold`] unless `threshold` is positive and finite.
    pub fn new(threshold: f64) -> Result<Self, MultipoleError> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(MultipoleError::InvalidThreshold(threshold));
        }
        Ok(ForceLaw { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Repulsion exerted by `u` on `v`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_multipole::models::Vector2D;
    /// use rs_multipole::multipole::ForceLaw;
    ///
    /// let law = ForceLaw::default();
    /// let f = law.force(Vector2D::new(0.0, 0.0), Vector2D::new(2.0, 0.0));
    /// assert_eq!(f, Vector2D::new(0.5, 0.0));
    ///
    /// // Coincident points are pushed apart with magnitude 1 / 0.1.
    /// let p = Vector2D::new(3.0, 3.0);
    /// assert_eq!(law.force(p, p).length(), 10.0);
    /// ```
    pub fn force(&self, u: Vector2D, v: Vector2D) -> Vector2D {
        self.force_oriented(u, v, true)
    }

    /// Same as [`ForceLaw::force`], but exactly coincident points are pushed
    /// along the fixed axis when `forward` and against it otherwise. Callers
    /// pass opposite flags for the two halves of a pair so they still separate.
    pub fn force_oriented(&self, u: Vector2D, v: Vector2D, forward: bool) -> Vector2D {
        let separation = v - u;
        let distance_squared = separation.length_squared();
        if distance_squared >= self.threshold {
            return separation / distance_squared;
        }
        let magnitude = 1.0 / self.threshold;
        if distance_squared > 0.0 {
            return separation / distance_squared.sqrt() * magnitude;
        }
        let axis = Vector2D::new(COINCIDENT_DIRECTION.0, COINCIDENT_DIRECTION.1);
        if forward { axis * magnitude } else { -axis * magnitude }
    }
}

/// Exact all-pairs summation, O(n^2). Adds the repulsion from every other
/// particle to each accumulator; used as ground truth for the tree.
pub fn direct_forces(particles: &mut [Particle], law: &ForceLaw) {
    let positions: Vec<Vector2D> = particles.iter().map(|p| p.position).collect();
    for (i, particle) in particles.iter_mut().enumerate() {
        for (j, source) in positions.iter().enumerate() {
            if i != j {
                particle.force += law.force_oriented(*source, positions[i], j < i);
            }
        }
    }
    debug!("Direct summation over {} particles", positions.len());
}
