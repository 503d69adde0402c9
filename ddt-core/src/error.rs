/// Error types for the projection pipeline
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for pipeline stages and configuration validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DdError {
    /// No readings were supplied
    #[error("No temperature readings supplied")]
    EmptyInput,

    /// Every day of the series is missing min/max values
    #[error("Insufficient data: every day of the series is missing temperatures")]
    InsufficientData,

    /// The normal window does not cover every calendar day
    #[error("Normal temperatures are missing for {missing} calendar days; at least one full year of history is required")]
    IncompleteNormal { missing: usize },

    /// Normal method name was not `mean` or `median`
    #[error("norm_method '{0}' not understood (use 'mean' or 'median')")]
    UnknownNormMethod(String),

    /// Degree-days per generation must be a positive number
    #[error("DD_per_gen must be a positive number (got {0})")]
    InvalidDegreeDaysPerGeneration(f64),

    /// At least one generation must be projected
    #[error("num_gen must be at least 1 (got {0})")]
    InvalidGenerationCount(u32),

    /// Start date missing or not in YYYY-MM-DD form
    #[error("Invalid start_date '{0}' (expected YYYY-MM-DD)")]
    InvalidStartDate(String),

    /// Date lies outside the accumulation series
    #[error("Date {0} is not in the temperature series")]
    DateNotFound(NaiveDate),

    /// The series ends before the degree-day threshold is crossed
    #[error("Series ends before generation {generation} ({threshold} degree-days after {start}); increase num_years_to_add_for_projection")]
    ThresholdNeverReached {
        start: NaiveDate,
        generation: u32,
        threshold: f64,
    },
}

/// Type alias for Results using DdError
pub type Result<T> = std::result::Result<T, DdError>;
