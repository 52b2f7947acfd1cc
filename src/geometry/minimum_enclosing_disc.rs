//! Smallest disc enclosing a point set.
//!
//! Welzl's randomized incremental algorithm with the move-to-front heuristic:
//! points found outside the current disc are pushed onto the boundary set of a
//! recursive call and then moved to the head of the working list, so later
//! scans meet the "hard" points first. The working list starts in input order
//! and is never shuffled, which keeps results reproducible.
use crate::geometry::Disc;
use crate::models::Vector2D;
use crate::utils::MultipoleError;

/// The minimal disc of a point set together with the points on its boundary
/// that determine it (one, two or three of them).
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumEnclosingDisc {
    pub disc: Disc,
    pub boundary: Vec<Vector2D>,
}

impl MinimumEnclosingDisc {
    /// Computes the minimum enclosing disc of `points` in expected linear time.
    ///
    /// # Errors
    /// [`MultipoleError::EmptyPointSet`] for an empty slice, and
    /// [`MultipoleError::CollinearBoundaryPoints`] if the recursion ever tries to
    /// build a circumcircle from collinear points, which signals a broken invariant.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_multipole::geometry::MinimumEnclosingDisc;
    /// use rs_multipole::models::Vector2D;
    ///
    /// let points = [
    ///     Vector2D::new(0.0, 0.0),
    ///     Vector2D::new(2.0, 0.0),
    ///     Vector2D::new(1.0, 0.5),
    /// ];
    /// let med = MinimumEnclosingDisc::linear_computation(&points).unwrap();
    /// assert_eq!(med.disc.center, Vector2D::new(1.0, 0.0));
    /// assert_eq!(med.disc.radius, 1.0);
    /// assert_eq!(med.boundary.len(), 2);
    /// ```
    pub fn linear_computation(points: &[Vector2D]) -> Result<Self, MultipoleError> {
        if points.is_empty() {
            return Err(MultipoleError::EmptyPointSet);
        }
        let mut solver = MoveToFront {
            points,
            order: (0..points.len()).collect(),
        };
        match solver.solve(points.len(), &[])? {
            Some(med) => Ok(med),
            None => Err(MultipoleError::EmptyPointSet),
        }
    }
}

struct MoveToFront<'a> {
    points: &'a [Vector2D],
    order: Vec<usize>,
}

impl MoveToFront<'_> {
    /// Minimal disc over the first `prefix` entries of the working list that
    /// has every point of `boundary` on its circle. `None` only when both are empty.
    fn solve(
        &mut self,
        prefix: usize,
        boundary: &[Vector2D],
    ) -> Result<Option<MinimumEnclosingDisc>, MultipoleError> {
        if boundary.len() == 3 {
            return Ok(Some(MinimumEnclosingDisc {
                disc: Disc::from_boundary(boundary)?,
                boundary: boundary.to_vec(),
            }));
        }

        let mut current = if boundary.is_empty() {
            None
        } else {
            Some(MinimumEnclosingDisc {
                disc: Disc::from_boundary(boundary)?,
                boundary: boundary.to_vec(),
            })
        };

        for i in 0..prefix {
            let point = self.points[self.order[i]];
            let covered = current
                .as_ref()
                .map_or(false, |med| med.disc.contains(point));
            if covered {
                continue;
            }
            let mut extended = Vec::with_capacity(boundary.len() + 1);
            extended.extend_from_slice(boundary);
            extended.push(point);
            current = self.solve(i, &extended)?;
            self.order[..=i].rotate_right(1);
        }
        Ok(current)
    }
}
