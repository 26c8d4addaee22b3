//! Text presentation of [`ScaledNumber`] values.
//!
//! Three independent styles are provided. All of them render zero as the
//! literal `"0"`.
//!
//! - **Short**: suffix notation (`1.50M`, `3.20Qa`), falling back to
//!   scientific notation below one and past the end of the suffix table.
//! - **Scientific**: `2.30e9`.
//! - **Engineering**: exponent rounded down to a multiple of three
//!   (`15.00e3`).

use crate::number::{ScaledNumber, pow10};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short-scale suffixes, one per power of one thousand, from `10^0` through
/// `10^63`.
pub const SUFFIXES: [&str; 22] = [
    "", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc", "UDc", "DDc", "TDc", "QaDc",
    "QiDc", "SxDc", "SpDc", "OcDc", "NoDc", "Vg",
];

/// A presentation style for [`ScaledNumber::format`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// Suffix notation: `1.50M`.
    #[default]
    Short,
    /// `{mantissa:.2}e{exponent}`.
    Scientific,
    /// Exponent rounded down to a multiple of three.
    Engineering,
}

impl ScaledNumber {
    /// Render using the given notation.
    pub fn format(&self, notation: Notation) -> String {
        match notation {
            Notation::Short => self.format_short(),
            Notation::Scientific => self.format_scientific(),
            Notation::Engineering => self.format_engineering(),
        }
    }

    /// Suffix notation.
    ///
    /// The suffix index is `exponent / 3` (truncating). Values whose index is
    /// negative render in scientific notation; values past the last suffix
    /// fall back to [`format_scientific`](Self::format_scientific). Plain
    /// values below one thousand render without decimals.
    pub fn format_short(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let index = self.exponent() / 3;
        if index < 0 {
            return format!("{:.2}e{}", self.mantissa(), self.exponent());
        }
        let Some(suffix) = SUFFIXES.get(index as usize) else {
            return self.format_scientific();
        };

        let display_exponent = self.exponent() - 3 * index;
        let display_value = self.mantissa() * pow10(display_exponent);

        if index == 0 && display_exponent >= 0 {
            format!("{display_value:.0}")
        } else {
            format!("{display_value:.2}{suffix}")
        }
    }

    /// `{mantissa:.2}e{exponent}`.
    pub fn format_scientific(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        format!("{:.2}e{}", self.mantissa(), self.exponent())
    }

    /// Engineering notation: the exponent is floored to a multiple of three
    /// (toward negative infinity) and the mantissa rescaled to match.
    pub fn format_engineering(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        // Widened: flooring i64::MIN to a multiple of three leaves i64 range.
        let exponent = i128::from(self.exponent());
        let rounded = exponent.div_euclid(3) * 3;
        let shift = (exponent - rounded) as i64;
        let value = self.mantissa() * pow10(shift);
        format!("{value:.2}e{rounded}")
    }
}

impl fmt::Display for ScaledNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_uses_suffixes() {
        assert_eq!(ScaledNumber::from_f64(1_500_000.0).format_short(), "1.50M");
        assert_eq!(ScaledNumber::from_f64(15_000.0).format_short(), "15.00K");
        assert_eq!(ScaledNumber::from_f64(250_000.0).format_short(), "250.00K");
        assert_eq!(ScaledNumber::from_parts(3.2, 15).format_short(), "3.20Qa");
        assert_eq!(ScaledNumber::from_parts(1.0, 63).format_short(), "1.00Vg");
    }

    #[test]
    fn short_plain_values_have_no_decimals() {
        assert_eq!(ScaledNumber::from_f64(999.0).format_short(), "999");
        assert_eq!(ScaledNumber::from_f64(7.0).format_short(), "7");
        assert_eq!(ScaledNumber::from_f64(-42.0).format_short(), "-42");
    }

    #[test]
    fn short_zero() {
        assert_eq!(ScaledNumber::ZERO.format_short(), "0");
        assert_eq!(ScaledNumber::ZERO.to_string(), "0");
    }

    #[test]
    fn short_fractions() {
        // exponent -1 truncates to suffix index 0
        assert_eq!(ScaledNumber::from_f64(0.5).format_short(), "0.50");
        // exponent -3 gives a negative index
        assert_eq!(ScaledNumber::from_f64(0.001).format_short(), "1.00e-3");
    }

    #[test]
    fn short_falls_back_past_table() {
        let n = ScaledNumber::from_parts(1.0, 66);
        assert_eq!(n.format_short(), n.format_scientific());
        assert_eq!(n.format_short(), "1.00e66");
    }

    #[test]
    fn scientific() {
        assert_eq!(ScaledNumber::from_parts(2.3, 9).format_scientific(), "2.30e9");
        assert_eq!(ScaledNumber::from_parts(-1.25, -4).format_scientific(), "-1.25e-4");
        assert_eq!(ScaledNumber::ZERO.format_scientific(), "0");
    }

    #[test]
    fn engineering() {
        assert_eq!(ScaledNumber::from_f64(15_000.0).format_engineering(), "15.00e3");
        assert_eq!(ScaledNumber::from_parts(1.0, 6).format_engineering(), "1.00e6");
        // -4 floors to -6, not -3
        assert_eq!(ScaledNumber::from_parts(2.5, -4).format_engineering(), "250.00e-6");
        assert_eq!(ScaledNumber::ZERO.format_engineering(), "0");
    }

    #[test]
    fn engineering_at_exponent_extremes() {
        assert_eq!(
            ScaledNumber::from_parts(1.0, i64::MIN).format_engineering(),
            "10.00e-9223372036854775809"
        );
        assert_eq!(
            ScaledNumber::from_parts(1.0, i64::MAX).format_engineering(),
            "10.00e9223372036854775806"
        );
        assert_eq!(
            ScaledNumber::from_parts(-2.0, i64::MIN + 2).format_engineering(),
            "-2.00e-9223372036854775806"
        );
    }

    #[test]
    fn notation_dispatch() {
        let n = ScaledNumber::from_f64(1_500_000.0);
        assert_eq!(n.format(Notation::Short), "1.50M");
        assert_eq!(n.format(Notation::Scientific), "1.50e6");
        assert_eq!(n.format(Notation::Engineering), "1.50e6");
        assert_eq!(format!("{n}"), "1.50M");
    }
}
