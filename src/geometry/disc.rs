use log::error;
use crate::models::Vector2D;
use crate::utils::{MultipoleError, DISC_TOLERANCE};

/// Largest |sin| of the angle at the first point for which three points still
/// count as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// A circle in the plane, used to bound the particles of a tree node.
///
/// # Examples
///
/// ```
/// use rs_multipole::geometry::Disc;
/// use rs_multipole::models::Vector2D;
///
/// let disc = Disc::from_two_points(Vector2D::new(0.0, 0.0), Vector2D::new(4.0, 0.0));
/// assert_eq!(disc.center, Vector2D::new(2.0, 0.0));
/// assert_eq!(disc.radius, 2.0);
/// assert!(disc.contains(Vector2D::new(2.0, 1.5)));
/// assert!(!disc.contains(Vector2D::new(2.0, 2.5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub center: Vector2D,
    pub radius: f64,
}

impl Disc {
    pub fn new(center: Vector2D, radius: f64) -> Self {
        Disc { center, radius }
    }

    /// Degenerate disc of radius 0 sitting on `point`.
    pub fn from_point(point: Vector2D) -> Self {
        Disc { center: point, radius: 0.0 }
    }

    /// Smallest disc with `a` and `b` on its boundary: they are diametrically opposite.
    pub fn from_two_points(a: Vector2D, b: Vector2D) -> Self {
        Disc {
            center: (a + b) * 0.5,
            radius: a.distance(&b) * 0.5,
        }
    }

    /// Circumcircle of a triangle.
    ///
    /// # Errors
    /// Returns [`MultipoleError::CollinearBoundaryPoints`] when the points are
    /// collinear (duplicates included), since no circle passes through them.
    pub fn from_three_points(a: Vector2D, b: Vector2D, c: Vector2D) -> Result<Self, MultipoleError> {
        // Work relative to `a` to keep the determinant well conditioned.
        let ab = b - a;
        let ac = c - a;
        let cross = ab.cross(&ac);
        if cross.abs() <= COLLINEAR_TOLERANCE * ab.length() * ac.length() {
            error!("Circumcircle requested for collinear points {:?}, {:?}, {:?}", a, b, c);
            return Err(MultipoleError::CollinearBoundaryPoints);
        }
        let d = 2.0 * cross;
        let ab2 = ab.length_squared();
        let ac2 = ac.length_squared();
        let offset = Vector2D::new(
            (ac.y * ab2 - ab.y * ac2) / d,
            (ab.x * ac2 - ac.x * ab2) / d,
        );
        let center = a + offset;
        // All three distances agree up to rounding; take the largest so none falls outside.
        let radius = offset.length()
            .max(center.distance(&b))
            .max(center.distance(&c));
        Ok(Disc { center, radius })
    }

    /// Builds the disc determined by one, two or three boundary points.
    ///
    /// # Errors
    /// Returns [`MultipoleError::EmptyPointSet`] for an empty slice and
    /// [`MultipoleError::CollinearBoundaryPoints`] for a degenerate triangle.
    /// More than three points cannot determine a disc and are reported as collinear.
    pub fn from_boundary(boundary: &[Vector2D]) -> Result<Self, MultipoleError> {
        match boundary {
            [] => Err(MultipoleError::EmptyPointSet),
            [a] => Ok(Disc::from_point(*a)),
            [a, b] => Ok(Disc::from_two_points(*a, *b)),
            [a, b, c] => Disc::from_three_points(*a, *b, *c),
            _ => {
                error!("A disc is determined by at most three points, got {}", boundary.len());
                Err(MultipoleError::CollinearBoundaryPoints)
            }
        }
    }

    /// True when `point` lies inside or on the circle, allowing a relative
    /// rounding slack of [`DISC_TOLERANCE`].
    pub fn contains(&self, point: Vector2D) -> bool {
        let distance = self.center.distance(&point);
        distance - self.radius <= DISC_TOLERANCE * self.radius
    }

    /// Two discs are well separated when the gap between their centers is at
    /// least the sum of their radii. Touching discs and concentric degenerate
    /// discs do not count, so a particle never sits on the expansion center of
    /// a node it is approximated against.
    pub fn is_separated_from(&self, other: &Disc) -> bool {
        let distance = self.center.distance(&other.center);
        let reach = self.radius + other.radius;
        distance - reach > DISC_TOLERANCE * (distance + reach)
    }

    pub fn intersects(&self, other: &Disc) -> bool {
        !self.is_separated_from(other)
    }
}
