use std::fmt::Debug;

use num::traits::{One, Zero};
use num::{BigInt, Signed, ToPrimitive};

use crate::MAX_DENOMINATOR;

pub type BigRatio = num::BigRational;
pub type Probability = BigRatio;

/// A probability mass, either exact or approximate.
pub trait Mass: Clone + Debug + PartialOrd + Send + Sync {
    fn zero() -> Self;

    fn from_ratio(value: &BigRatio) -> Self;

    fn add_mass(&mut self, rhs: &Self);

    fn as_f64(&self) -> f64;

    /// Whether an accumulated mass has reached `target`.
    fn reaches(&self, target: &Self) -> bool;
}

/// Rounding slack when float masses are compared after accumulation.
const FLOAT_MASS_TOLERANCE: f64 = 1e-9;

impl Mass for Probability {
    fn zero() -> Self {
        <Self as Zero>::zero()
    }

    fn from_ratio(value: &BigRatio) -> Self {
        value.clone()
    }

    fn add_mass(&mut self, rhs: &Self) {
        *self += rhs;
    }

    fn as_f64(&self) -> f64 {
        to_f64(self)
    }

    fn reaches(&self, target: &Self) -> bool {
        self >= target
    }
}

impl Mass for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_ratio(value: &BigRatio) -> Self {
        to_f64(value)
    }

    fn add_mass(&mut self, rhs: &Self) {
        *self += rhs;
    }

    fn as_f64(&self) -> f64 {
        *self
    }

    fn reaches(&self, target: &Self) -> bool {
        *self >= *target - FLOAT_MASS_TOLERANCE
    }
}

#[must_use]
pub(crate) fn to_f64(value: &BigRatio) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[must_use]
pub(crate) fn integer(value: impl Into<BigInt>) -> BigRatio {
    BigRatio::from_integer(value.into())
}

/// Converts a float with [`MAX_DENOMINATOR`]. Returns `None` for NaN and infinities.
#[must_use]
pub(crate) fn from_f64(value: f64) -> Option<BigRatio> {
    BigRatio::from_float(value).map(|x| limit_denominator(&x, MAX_DENOMINATOR))
}

/// Closest ratio to `value` whose denominator does not exceed `max_denominator`.
///
/// Walks the continued fraction expansion of `value` until the next convergent's
/// denominator would be too large, then picks whichever of the last convergent
/// and the best semiconvergent lies closer (the convergent on a tie). A float
/// such as `0.1` is stored as `3602879701896397/36028797018963968`; limited to a
/// denominator of one million it becomes `1/10`.
///
/// A `max_denominator` of zero is treated as one.
#[must_use]
pub fn limit_denominator(value: &BigRatio, max_denominator: u64) -> BigRatio {
    let max = BigInt::from(max_denominator.max(1));
    if value.denom() <= &max {
        return value.clone();
    }
    if value.is_negative() {
        return -limit_denominator(&-value, max_denominator);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (
        BigInt::zero(),
        BigInt::one(),
        BigInt::one(),
        BigInt::zero(),
    );
    let mut n = value.numer().clone();
    let mut d = value.denom().clone();
    loop {
        let a = &n / &d;
        let q2 = &q0 + &a * &q1;
        if q2 > max {
            break;
        }
        let p2 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, p2);
        q0 = std::mem::replace(&mut q1, q2);
        let r = &n - &a * &d;
        n = std::mem::replace(&mut d, r);
    }

    let k = (&max - &q0) / &q1;
    let semi = BigRatio::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let conv = BigRatio::new(p1, q1);
    if (&conv - value).abs() <= (&semi - value).abs() {
        conv
    } else {
        semi
    }
}
