//! Ascension Core -- numeric and event primitives for idle-game economies.
//!
//! This crate provides the value type every other Ascension crate is built
//! on, plus the small amount of shared plumbing (clocks, event channels)
//! the stateful modules need.
//!
//! # Scaled Numbers
//!
//! Idle games routinely deal in quantities far beyond `f64` range. A
//! [`number::ScaledNumber`] stores `mantissa * 10^exponent` with the
//! mantissa normalized into `[1, 10)`, trading exact precision for range:
//!
//! ```rust
//! use ascension_core::number::ScaledNumber;
//!
//! let income = ScaledNumber::from_parts(2.5, 400);
//! let total = income * 3.0;
//! assert_eq!(total.format_scientific(), "7.50e400");
//! ```
//!
//! # Key Types
//!
//! - [`number::ScaledNumber`] -- normalized mantissa/exponent pair with
//!   arithmetic, total ordering, and formatting.
//! - [`format::Notation`] -- short-suffix, scientific, and engineering
//!   presentation styles.
//! - [`clock::Clock`] -- injectable wall-clock source; operations that stamp
//!   time take a [`clock::Timestamp`] argument rather than reading the
//!   system clock themselves.
//! - [`event::EventChannel`] -- synchronous listeners plus a pending queue
//!   for callers that prefer polling.

pub mod clock;
pub mod event;
pub mod format;
pub mod number;
pub mod parse;

pub use number::ScaledNumber;
