//! Core types shared by every stage of the degree-day projection pipeline.
//!
//! Nothing in this crate performs I/O. Collaborators build [`reading::Reading`]s
//! or a [`daily::DailySeries`] and hand them to the stages in `ddt-data` and
//! `ddt-model` together with a validated [`config::ProjectionConfig`].

pub mod config;
pub mod daily;
pub mod date_range;
pub mod diagnostic;
pub mod error;
pub mod month_day;
pub mod reading;
