//! Reading pace calculations.
//!
//! This module converts between a page count, a deadline and a set of
//! reading weekdays on one side and a daily page quota on the other.

pub mod common;
pub mod pace;

pub use pace::{PaceCalculator, PaceError};
