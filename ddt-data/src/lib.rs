//! Data processing for temperature series.
//!
//! This crate turns raw readings into a complete daily min/max series and
//! extends it into the future with normal temperatures:
//!
//! readings → [`aggregate`] → [`interpolation`] → [`normal`]

pub mod aggregate;
pub mod interpolation;
pub mod normal;
