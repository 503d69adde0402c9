//! Typed configuration for one projection run.
//!
//! Text configuration (files, command-line flags) is collected into a
//! [`RawProjectionConfig`] and converted once into a validated
//! [`ProjectionConfig`]; the pipeline stages only ever see the typed form.

use crate::error::{DdError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_BASE_TEMP: f64 = 54.3;
pub const DEFAULT_DD_PER_GEN: f64 = 622.0;
pub const DEFAULT_NUM_GEN: u32 = 3;
/// Days with fewer readings are excluded from the min/max calculation.
pub const DEFAULT_MIN_READINGS_PER_DAY: u32 = 4;
pub const DEFAULT_MAX_NUM_YEARS_TO_NORM: u32 = 6;
pub const DEFAULT_NUM_YEARS_TO_ADD_FOR_PROJECTION: u32 = 3;
/// Number of points averaged on the ends of gaps before interpolating.
pub const DEFAULT_INTERPOLATION_WINDOW: u32 = 3;

pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

/// Central tendency used for normal temperatures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum NormMethod {
    Mean,
    #[default]
    Median,
}

impl FromStr for NormMethod {
    type Err = DdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(NormMethod::Mean),
            "median" => Ok(NormMethod::Median),
            _ => Err(DdError::UnknownNormMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for NormMethod {
    type Error = DdError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for NormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormMethod::Mean => write!(f, "mean"),
            NormMethod::Median => write!(f, "median"),
        }
    }
}

/// Validated parameters for a projection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionConfig {
    pub base_temp: f64,
    #[serde(rename = "DD_per_gen")]
    pub dd_per_gen: f64,
    pub num_gen: u32,
    pub min_readings_per_day: u32,
    /// 0 uses all available history.
    pub max_num_years_to_norm: u32,
    pub norm_method: NormMethod,
    pub num_years_to_add_for_projection: u32,
    pub interpolation_window: u32,
    pub start_date: NaiveDate,
}

impl ProjectionConfig {
    /// Configuration with the default model parameters for the given start date.
    pub fn with_start_date(start_date: NaiveDate) -> Self {
        ProjectionConfig {
            base_temp: DEFAULT_BASE_TEMP,
            dd_per_gen: DEFAULT_DD_PER_GEN,
            num_gen: DEFAULT_NUM_GEN,
            min_readings_per_day: DEFAULT_MIN_READINGS_PER_DAY,
            max_num_years_to_norm: DEFAULT_MAX_NUM_YEARS_TO_NORM,
            norm_method: NormMethod::default(),
            num_years_to_add_for_projection: DEFAULT_NUM_YEARS_TO_ADD_FOR_PROJECTION,
            interpolation_window: DEFAULT_INTERPOLATION_WINDOW,
            start_date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dd_per_gen.is_finite() && self.dd_per_gen > 0.0) {
            return Err(DdError::InvalidDegreeDaysPerGeneration(self.dd_per_gen));
        }
        if self.num_gen < 1 {
            return Err(DdError::InvalidGenerationCount(self.num_gen));
        }
        Ok(())
    }
}

/// Loosely-typed configuration as read from text. Every field is optional;
/// missing fields take the defaults above, except `start_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProjectionConfig {
    pub base_temp: Option<f64>,
    #[serde(rename = "DD_per_gen")]
    pub dd_per_gen: Option<f64>,
    pub num_gen: Option<u32>,
    #[serde(alias = "min_points_per_day")]
    pub min_readings_per_day: Option<u32>,
    pub max_num_years_to_norm: Option<u32>,
    pub norm_method: Option<String>,
    pub num_years_to_add_for_projection: Option<u32>,
    pub interpolation_window: Option<u32>,
    pub start_date: Option<String>,
}

impl RawProjectionConfig {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: RawProjectionConfig) -> RawProjectionConfig {
        RawProjectionConfig {
            base_temp: other.base_temp.or(self.base_temp),
            dd_per_gen: other.dd_per_gen.or(self.dd_per_gen),
            num_gen: other.num_gen.or(self.num_gen),
            min_readings_per_day: other.min_readings_per_day.or(self.min_readings_per_day),
            max_num_years_to_norm: other.max_num_years_to_norm.or(self.max_num_years_to_norm),
            norm_method: other.norm_method.or(self.norm_method),
            num_years_to_add_for_projection: other
                .num_years_to_add_for_projection
                .or(self.num_years_to_add_for_projection),
            interpolation_window: other.interpolation_window.or(self.interpolation_window),
            start_date: other.start_date.or(self.start_date),
        }
    }
}

impl TryFrom<RawProjectionConfig> for ProjectionConfig {
    type Error = DdError;

    fn try_from(raw: RawProjectionConfig) -> Result<Self> {
        let norm_method = match raw.norm_method.as_deref() {
            Some(name) => name.parse()?,
            None => NormMethod::default(),
        };
        let start_text = raw.start_date.unwrap_or_default();
        let start_date = NaiveDate::parse_from_str(start_text.trim(), START_DATE_FORMAT)
            .map_err(|_| DdError::InvalidStartDate(start_text.clone()))?;
        let config = ProjectionConfig {
            base_temp: raw.base_temp.unwrap_or(DEFAULT_BASE_TEMP),
            dd_per_gen: raw.dd_per_gen.unwrap_or(DEFAULT_DD_PER_GEN),
            num_gen: raw.num_gen.unwrap_or(DEFAULT_NUM_GEN),
            min_readings_per_day: raw
                .min_readings_per_day
                .unwrap_or(DEFAULT_MIN_READINGS_PER_DAY),
            max_num_years_to_norm: raw
                .max_num_years_to_norm
                .unwrap_or(DEFAULT_MAX_NUM_YEARS_TO_NORM),
            norm_method,
            num_years_to_add_for_projection: raw
                .num_years_to_add_for_projection
                .unwrap_or(DEFAULT_NUM_YEARS_TO_ADD_FOR_PROJECTION),
            interpolation_window: raw
                .interpolation_window
                .unwrap_or(DEFAULT_INTERPOLATION_WINDOW),
            start_date,
        };
        config.validate()?;
        Ok(config)
    }
}
