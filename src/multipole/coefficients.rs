//! Truncated far-field expansions of a cluster of unit sources.
//!
//! For sources `z_i` around a center `z0` the coefficients are
//! `a_0 = n` and `a_k = (1/k) Σ (z_i - z0)^k`, so that for `|v - z0|` larger
//! than the cluster radius
//!
//! `Σ_i 1 / (v - z_i) = a_0 / (v - z0) + Σ_{k>=1} k a_k / (v - z0)^(k+1)`.
//!
//! Reading `1 / (v - z)` as the vector `(v - z) / |v - z|^2` (real part, negated
//! imaginary part) turns the series into the summed repulsion felt at `v`.
use log::error;
use crate::models::{Complex, Vector2D};
use crate::utils::MultipoleError;

#[derive(Debug, Clone, PartialEq)]
pub struct MultipoleCoefficients {
    center: Complex,
    coefficients: Vec<Complex>,
}

impl MultipoleCoefficients {
    /// Expands the unit sources at `points` about `center` with `precision` terms.
    ///
    /// # Errors
    /// [`MultipoleError::InvalidPrecision`] when `precision` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_multipole::models::{Complex, Vector2D};
    /// use rs_multipole::multipole::MultipoleCoefficients;
    ///
    /// let points = [Vector2D::new(1.0, 0.0), Vector2D::new(-1.0, 0.0)];
    /// let expansion = MultipoleCoefficients::from_points(3, Vector2D::zero(), &points).unwrap();
    /// assert_eq!(expansion.coefficients()[0], Complex::new(2.0, 0.0));
    /// assert_eq!(expansion.coefficients()[1], Complex::ZERO);
    /// assert_eq!(expansion.coefficients()[2], Complex::new(1.0, 0.0));
    /// ```
    pub fn from_points(
        precision: usize,
        center: Vector2D,
        points: &[Vector2D],
    ) -> Result<Self, MultipoleError> {
        if precision == 0 {
            return Err(MultipoleError::InvalidPrecision(precision));
        }
        let center = Complex::from(center);
        let mut coefficients = vec![Complex::ZERO; precision];
        coefficients[0] = Complex::new(points.len() as f64, 0.0);
        for (k, coefficient) in coefficients.iter_mut().enumerate().skip(1) {
            let mut sum = Complex::ZERO;
            for point in points {
                sum += (Complex::from(*point) - center).powi(k as u32);
            }
            *coefficient = sum / k as f64;
        }
        Ok(MultipoleCoefficients { center, coefficients })
    }

    /// Re-expands two child expansions about `center` and adds them.
    ///
    /// # Errors
    /// [`MultipoleError::PrecisionMismatch`] when the children disagree on the
    /// number of terms.
    pub fn combine(
        center: Vector2D,
        left: &MultipoleCoefficients,
        right: &MultipoleCoefficients,
    ) -> Result<Self, MultipoleError> {
        if left.precision() != right.precision() {
            error!(
                "Refusing to combine expansions of precision {} and {}",
                left.precision(),
                right.precision()
            );
            return Err(MultipoleError::PrecisionMismatch {
                left: left.precision(),
                right: right.precision(),
            });
        }
        let center = Complex::from(center);
        let coefficients = left
            .shifted(center)
            .into_iter()
            .zip(right.shifted(center))
            .map(|(a, b)| a + b)
            .collect();
        Ok(MultipoleCoefficients { center, coefficients })
    }

    /// Coefficients of the same field expanded about `new_center`.
    ///
    /// With `d = z0 - z1`: `b_0 = a_0` and
    /// `b_l = a_0 d^l / l + Σ_{k=1..l} C(l-1, k-1) a_k d^(l-k)`.
    pub fn shifted(&self, new_center: Complex) -> Vec<Complex> {
        let a = &self.coefficients;
        let d = self.center - new_center;
        let mut shifted = Vec::with_capacity(a.len());
        shifted.push(a[0]);
        for l in 1..a.len() {
            let mut b = a[0] * d.powi(l as u32) / l as f64;
            for k in 1..=l {
                b += a[k] * d.powi((l - k) as u32) * binomial(l - 1, k - 1);
            }
            shifted.push(b);
        }
        shifted
    }

    /// Repulsion at `v` from every source folded into this expansion.
    ///
    /// All `precision` terms are evaluated. `v` must lie outside the disc the
    /// sources were drawn from, otherwise the series does not converge.
    pub fn approximate_force(&self, v: Vector2D) -> Vector2D {
        let inverse = Complex::ONE / (Complex::from(v) - self.center);
        let mut inverse_power = inverse;
        let mut sum = self.coefficients[0] * inverse;
        for (k, a) in self.coefficients.iter().enumerate().skip(1) {
            inverse_power = inverse_power * inverse;
            sum += *a * inverse_power * k as f64;
        }
        Vector2D::new(sum.re, -sum.im)
    }

    pub fn precision(&self) -> usize {
        self.coefficients.len()
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.center.re, self.center.im)
    }

    pub fn coefficients(&self) -> &[Complex] {
        &self.coefficients
    }
}

/// `C(n, k)` by the multiplicative formula; exact in f64 for the small
/// arguments the expansions use.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}
