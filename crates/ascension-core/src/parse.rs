//! Parsing [`ScaledNumber`] values from text.
//!
//! Accepts plain decimals (`"1500"`, `"-2.5"`) and scientific notation whose
//! exponent may lie far outside `f64` range (`"1.5e400"`). Used by data
//! files and debug consoles; formatted output from
//! [`ScaledNumber::format_scientific`] parses back to the same value.

use crate::number::ScaledNumber;
use std::str::FromStr;

/// Errors that can occur while parsing a [`ScaledNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNumberError {
    #[error("cannot parse a number from an empty string")]
    Empty,

    #[error("invalid mantissa '{0}'")]
    InvalidMantissa(String),

    #[error("invalid exponent '{0}'")]
    InvalidExponent(String),
}

impl FromStr for ScaledNumber {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseNumberError::Empty);
        }

        let (mantissa_text, exponent_text) = match s.find(['e', 'E']) {
            Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
            None => (s, None),
        };

        let mantissa: f64 = mantissa_text
            .parse()
            .ok()
            .filter(|m: &f64| m.is_finite())
            .ok_or_else(|| ParseNumberError::InvalidMantissa(mantissa_text.to_string()))?;

        let exponent: i64 = match exponent_text {
            Some(text) => text
                .strip_prefix('+')
                .unwrap_or(text)
                .parse()
                .map_err(|_| ParseNumberError::InvalidExponent(text.to_string()))?,
            None => 0,
        };

        Ok(ScaledNumber::from_parts(mantissa, exponent))
    }
}
