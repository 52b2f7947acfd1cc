use crate::models::Vector2D;

/// A layout node as seen by the force kernel: where it is and how hard it is
/// being pushed.
///
/// Particles stay owned by the caller. Trees refer to them by their index in
/// the slice they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position; must not change while a force pass is running.
    pub position: Vector2D,
    /// Accumulated repulsive force. Passes only ever add to it.
    pub force: Vector2D,
}

impl Particle {
    /// Creates a particle at `(x, y)` with no accumulated force.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_multipole::models::{Particle, Vector2D};
    ///
    /// let particle = Particle::new(1.0, 2.0);
    /// assert_eq!(particle.position, Vector2D::new(1.0, 2.0));
    /// assert_eq!(particle.force, Vector2D::zero());
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Particle {
            position: Vector2D::new(x, y),
            force: Vector2D::zero(),
        }
    }

    pub fn at(position: Vector2D) -> Self {
        Particle {
            position,
            force: Vector2D::zero(),
        }
    }

    pub fn reset_force(&mut self) {
        self.force = Vector2D::zero();
    }
}

/// Zeroes the force accumulator of every particle ahead of a new pass.
pub fn reset_forces(particles: &mut [Particle]) {
    for particle in particles.iter_mut() {
        particle.reset_force();
    }
}
