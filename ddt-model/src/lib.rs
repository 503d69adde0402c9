//! Thermal model and generation projection.
//!
//! - [`degree_day`]: Baskerville-Ermin single-sine degree-days and their
//!   running sum
//! - [`generation`]: dates at which multiples of the per-generation
//!   requirement are reached
//! - [`pipeline`]: the complete readings → generation dates run

pub mod degree_day;
pub mod generation;
pub mod pipeline;
