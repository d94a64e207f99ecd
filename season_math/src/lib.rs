//! # Season Math
//!
//! Calendar and numeric helpers shared by the snow forecast crates.
//! This crate provides the month arithmetic, ski-season labelling and
//! small series utilities (means, clipping, gap filling) that the
//! feature preparation and season comparison stages are built on.

use thiserror::Error;

// Helper modules
pub mod calendar;
pub mod fill;
pub mod season;
pub mod stats;

pub use calendar::{add_months, first_of_month, month_index, month_label, validate_month};
pub use fill::{backward_fill, forward_backward_fill, forward_fill};
pub use season::{
    SeasonCalendar, SeasonLabel, DEFAULT_SEASON_START_MONTH, DEFAULT_SEASON_WINDOW,
    DEFAULT_WINTER_MONTHS,
};
pub use stats::{clip_lower, clip_non_negative, mean, round_to};

/// Errors that can occur in calendar and series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for season math operations
pub type Result<T> = std::result::Result<T, MathError>;
