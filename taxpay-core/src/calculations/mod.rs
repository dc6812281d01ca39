//! Tax liability calculations.
//!
//! Schedules live in [`schedule`], the band-by-band walk in [`calculator`],
//! and money formatting shared with receipts in [`common`].

pub mod calculator;
pub mod common;
pub mod schedule;

pub use calculator::{BracketLine, TaxCalculator, TaxCalculatorError, TaxComputation};
pub use schedule::{ScheduleBook, ScheduleError, validate_schedule};
