//! Minimal complex arithmetic for the multipole expansions.
//!
//! Points of the plane are read as `x + iy`. Only the operations the series
//! need are provided; integer powers go through repeated squaring so small
//! exponents stay exact up to the rounding of each multiplication.
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use approx::{AbsDiffEq, RelativeEq};
use crate::models::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    pub fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn conj(&self) -> Complex {
        Complex::new(self.re, -self.im)
    }

    /// Raises `self` to a non-negative integer power by repeated squaring.
    ///
    /// # Example
    /// ```
    /// use rs_multipole::models::Complex;
    ///
    /// let i = Complex::new(0.0, 1.0);
    /// assert_eq!(i.powi(2), Complex::new(-1.0, 0.0));
    /// assert_eq!(i.powi(4), Complex::ONE);
    /// assert_eq!(Complex::new(3.0, -2.0).powi(0), Complex::ONE);
    /// ```
    pub fn powi(&self, exponent: u32) -> Complex {
        let mut result = Complex::ONE;
        let mut base = *self;
        let mut e = exponent;
        while e > 0 {
            if e & 1 == 1 {
                result = result * base;
            }
            e >>= 1;
            if e > 0 {
                base = base * base;
            }
        }
        result
    }
}

impl From<Vector2D> for Complex {
    fn from(v: Vector2D) -> Self {
        Complex::new(v.x, v.y)
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Complex {
    fn add_assign(&mut self, rhs: Complex) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Complex;

    fn mul(self, rhs: f64) -> Complex {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}

impl Div for Complex {
    type Output = Complex;

    fn div(self, rhs: Complex) -> Complex {
        let denom = rhs.norm_sqr();
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / denom,
            (self.im * rhs.re - self.re * rhs.im) / denom,
        )
    }
}

impl Div<f64> for Complex {
    type Output = Complex;

    fn div(self, rhs: f64) -> Complex {
        Complex::new(self.re / rhs, self.im / rhs)
    }
}

impl AbsDiffEq for Complex {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.re.abs_diff_eq(&other.re, epsilon) && self.im.abs_diff_eq(&other.im, epsilon)
    }
}

impl RelativeEq for Complex {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.re.relative_eq(&other.re, epsilon, max_relative)
            && self.im.relative_eq(&other.im, epsilon, max_relative)
    }
}
