//! Scaled arbitrary-range decimal numbers.
//!
//! A [`ScaledNumber`] represents `mantissa * 10^exponent` with the mantissa
//! kept in `[1, 10)` (by magnitude) or the explicit zero state. The sign is
//! carried entirely by the mantissa; a negative exponent only means the
//! magnitude is below one.
//!
//! The mantissa is an `f64`, so arithmetic is approximate. Adding two values
//! whose exponents differ by more than ~16 orders of magnitude silently drops
//! the smaller operand. That is the expected behavior for idle-game totals,
//! not a bug.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Largest decimal exponent representable by an `f64`.
const F64_MAX_EXPONENT: i64 = 308;

/// `10^exp` as an `f64`, clamped so huge negative shifts collapse to zero
/// instead of overflowing the `i32` argument of `powi`.
#[inline]
pub(crate) fn pow10(exp: i64) -> f64 {
    if exp < -(F64_MAX_EXPONENT + 16) {
        0.0
    } else if exp > F64_MAX_EXPONENT + 16 {
        f64::INFINITY
    } else {
        10f64.powi(exp as i32)
    }
}

// ---------------------------------------------------------------------------
// ScaledNumber
// ---------------------------------------------------------------------------

/// A normalized `mantissa * 10^exponent` value.
///
/// Invariants:
/// - non-zero: `1.0 <= |mantissa| < 10.0`
/// - zero: `is_zero == true`, `mantissa == 0.0`, `exponent == 0`
///
/// Every constructor and arithmetic result goes through normalization, so
/// the invariants hold for any value observable from outside this module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "RawScaledNumber", into = "RawScaledNumber")]
pub struct ScaledNumber {
    mantissa: f64,
    exponent: i64,
    is_zero: bool,
}

/// On-disk shape of a [`ScaledNumber`]. Deserialized values are
/// renormalized so a hand-edited save cannot break the invariants.
#[derive(Serialize, Deserialize)]
struct RawScaledNumber {
    mantissa: f64,
    exponent: i64,
    #[serde(default)]
    is_zero: bool,
}

impl From<RawScaledNumber> for ScaledNumber {
    fn from(raw: RawScaledNumber) -> Self {
        if raw.is_zero {
            Self::ZERO
        } else {
            Self::from_parts(raw.mantissa, raw.exponent)
        }
    }
}

impl From<ScaledNumber> for RawScaledNumber {
    fn from(n: ScaledNumber) -> Self {
        Self {
            mantissa: n.mantissa,
            exponent: n.exponent,
            is_zero: n.is_zero,
        }
    }
}

impl ScaledNumber {
    /// The canonical zero.
    pub const ZERO: Self = Self {
        mantissa: 0.0,
        exponent: 0,
        is_zero: true,
    };

    /// The value one.
    pub const ONE: Self = Self {
        mantissa: 1.0,
        exponent: 0,
        is_zero: false,
    };

    // -- Construction --

    /// The canonical zero.
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// The value one.
    pub const fn one() -> Self {
        Self::ONE
    }

    /// Build from a plain `f64`.
    ///
    /// `NaN` becomes zero and infinities saturate to `±f64::MAX`.
    pub fn from_f64(value: f64) -> Self {
        if value == 0.0 {
            return Self::ZERO;
        }
        Self::from_parts(value, 0)
    }

    /// Build from an arbitrary mantissa/exponent pair, normalizing it.
    /// Used for already-scaled values such as those loaded from a save.
    pub fn from_parts(mantissa: f64, exponent: i64) -> Self {
        if mantissa.is_nan() || mantissa == 0.0 {
            return Self::ZERO;
        }
        let mantissa = if mantissa.is_infinite() {
            f64::MAX.copysign(mantissa)
        } else {
            mantissa
        };

        let negative = mantissa < 0.0;
        let mut magnitude = mantissa.abs();
        let mut exponent = exponent;

        loop {
            if magnitude >= 10.0 {
                magnitude /= 10.0;
                exponent = exponent.saturating_add(1);
            } else if magnitude < 1.0 {
                magnitude *= 10.0;
                exponent = exponent.saturating_sub(1);
            } else {
                break;
            }
        }

        Self {
            mantissa: if negative { -magnitude } else { magnitude },
            exponent,
            is_zero: false,
        }
    }

    // -- Accessors --

    /// The normalized mantissa. `0.0` for zero.
    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    /// The power-of-ten scale. `0` for zero.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Whether this is the canonical zero.
    pub fn is_zero(&self) -> bool {
        self.is_zero
    }

    /// Whether the value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero && self.mantissa < 0.0
    }

    /// `-1.0`, `0.0`, or `1.0` depending on the sign.
    pub fn signum(&self) -> f64 {
        if self.is_zero { 0.0 } else { self.mantissa.signum() }
    }

    /// Convert to an `f64`.
    ///
    /// Values above `f64` range saturate to `±f64::MAX`; values below
    /// `1e-308` in magnitude become `0.0`.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero || self.exponent < -F64_MAX_EXPONENT {
            return 0.0;
        }
        if self.exponent > F64_MAX_EXPONENT {
            return f64::MAX.copysign(self.mantissa);
        }
        let value = self.mantissa * pow10(self.exponent);
        if value.is_infinite() {
            f64::MAX.copysign(self.mantissa)
        } else {
            value
        }
    }

    /// Base-10 logarithm of the magnitude. Negative infinity for zero.
    pub fn log10(&self) -> f64 {
        if self.is_zero {
            return f64::NEG_INFINITY;
        }
        self.exponent as f64 + self.mantissa.abs().log10()
    }

    // -- Arithmetic --

    /// Sum of two values.
    ///
    /// Operands are aligned to the larger exponent before adding, so the
    /// smaller one loses precision (or vanishes) when the exponents are far
    /// apart.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: Self) -> Self {
        if self.is_zero {
            return other;
        }
        if other.is_zero {
            return self;
        }
        let max_exponent = self.exponent.max(other.exponent);
        let a = self.mantissa * pow10(self.exponent.saturating_sub(max_exponent));
        let b = other.mantissa * pow10(other.exponent.saturating_sub(max_exponent));
        Self::from_parts(a + b, max_exponent)
    }

    /// Difference of two values. `0 - b` is `-b`.
    pub fn subtract(self, other: Self) -> Self {
        if other.is_zero {
            return self;
        }
        if self.is_zero {
            return other.negate();
        }
        let max_exponent = self.exponent.max(other.exponent);
        let a = self.mantissa * pow10(self.exponent.saturating_sub(max_exponent));
        let b = other.mantissa * pow10(other.exponent.saturating_sub(max_exponent));
        Self::from_parts(a - b, max_exponent)
    }

    /// Product of two values.
    pub fn multiply(self, other: Self) -> Self {
        if self.is_zero || other.is_zero {
            return Self::ZERO;
        }
        Self::from_parts(
            self.mantissa * other.mantissa,
            self.exponent.saturating_add(other.exponent),
        )
    }

    /// Quotient of two values.
    ///
    /// Division by zero yields zero rather than an error or infinity; check
    /// [`is_zero`](Self::is_zero) on the divisor first if that matters.
    pub fn divide(self, other: Self) -> Self {
        if self.is_zero || other.is_zero {
            return Self::ZERO;
        }
        Self::from_parts(
            self.mantissa / other.mantissa,
            self.exponent.saturating_sub(other.exponent),
        )
    }

    /// Scale by a plain `f64` factor.
    pub fn multiply_scalar(self, scalar: f64) -> Self {
        if self.is_zero || scalar == 0.0 {
            return Self::ZERO;
        }
        Self::from_parts(self.mantissa * scalar, self.exponent)
    }

    /// Raise to a (possibly fractional) power.
    ///
    /// Zero stays zero for every exponent, including `0`. Any non-zero base
    /// raised to `0` is one. The fractional part of `exponent * power` is
    /// folded back into the mantissa so fractional powers of huge values stay
    /// accurate. A negative base with a fractional power has no real result
    /// and yields zero.
    pub fn pow(self, power: f64) -> Self {
        if self.is_zero {
            return Self::ZERO;
        }
        if power == 0.0 {
            return Self::ONE;
        }
        let scaled_exponent = self.exponent as f64 * power;
        let whole = scaled_exponent.floor();
        let fraction = scaled_exponent - whole;
        let mantissa = self.mantissa.powf(power) * 10f64.powf(fraction);
        Self::from_parts(mantissa, whole as i64)
    }

    /// Additive inverse.
    pub fn negate(self) -> Self {
        if self.is_zero {
            return self;
        }
        Self {
            mantissa: -self.mantissa,
            ..self
        }
    }

    /// Magnitude.
    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            ..self
        }
    }

    /// The larger of two values.
    pub fn max(self, other: Self) -> Self {
        if self.less_than(&other) { other } else { self }
    }

    /// The smaller of two values.
    pub fn min(self, other: Self) -> Self {
        if self.greater_than(&other) { other } else { self }
    }

    // -- In-place accumulators --

    /// `self = self + other`, for per-frame accumulators.
    pub fn add_in_place(&mut self, other: Self) {
        *self = self.add(other);
    }

    /// `self = self - other`.
    pub fn subtract_in_place(&mut self, other: Self) {
        *self = self.subtract(other);
    }

    /// `self = self * scalar`.
    pub fn multiply_in_place(&mut self, scalar: f64) {
        *self = self.multiply_scalar(scalar);
    }

    // -- Comparison --

    /// Total order over scaled numbers.
    ///
    /// Zero against non-zero is decided by the non-zero's sign. Two non-zero
    /// values compare by sign, then exponent (larger wins for positives,
    /// loses for negatives), then mantissa.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.is_zero, other.is_zero) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if other.mantissa > 0.0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if self.mantissa > 0.0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => {
                let self_positive = self.mantissa > 0.0;
                let other_positive = other.mantissa > 0.0;
                if self_positive != other_positive {
                    return if self_positive {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    };
                }
                let by_exponent = if self_positive {
                    self.exponent.cmp(&other.exponent)
                } else {
                    other.exponent.cmp(&self.exponent)
                };
                by_exponent.then_with(|| self.mantissa.total_cmp(&other.mantissa))
            }
        }
    }

    /// `self == other` under [`compare`](Self::compare).
    pub fn equals(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// `self < other`.
    pub fn less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// `self > other`.
    pub fn greater_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

impl Default for ScaledNumber {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for ScaledNumber {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<u64> for ScaledNumber {
    fn from(value: u64) -> Self {
        Self::from_f64(value as f64)
    }
}

// ---------------------------------------------------------------------------
// Ordering traits
// ---------------------------------------------------------------------------

impl PartialEq for ScaledNumber {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for ScaledNumber {}

impl PartialOrd for ScaledNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScaledNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

impl Add for ScaledNumber {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        ScaledNumber::add(self, rhs)
    }
}

impl Sub for ScaledNumber {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl Mul for ScaledNumber {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl Mul<f64> for ScaledNumber {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.multiply_scalar(rhs)
    }
}

impl Div for ScaledNumber {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.divide(rhs)
    }
}

impl Neg for ScaledNumber {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl AddAssign for ScaledNumber {
    fn add_assign(&mut self, rhs: Self) {
        self.add_in_place(rhs);
    }
}

impl SubAssign for ScaledNumber {
    fn sub_assign(&mut self, rhs: Self) {
        self.subtract_in_place(rhs);
    }
}

impl MulAssign<f64> for ScaledNumber {
    fn mul_assign(&mut self, rhs: f64) {
        self.multiply_in_place(rhs);
    }
}

impl Sum for ScaledNumber {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, n| acc.add(n))
    }
}

impl<'a> Sum<&'a ScaledNumber> for ScaledNumber {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, n| acc.add(*n))
    }
}
