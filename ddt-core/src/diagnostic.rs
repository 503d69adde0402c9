//! Non-fatal data-quality findings raised while a pipeline runs.
//!
//! Each finding is logged at `warn` level when raised and kept so the caller
//! can surface it (console, report appendix, ...).

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Fewer years of history than requested for the normal.
    NormalWindowClipped {
        requested_years: u32,
        requested_start: NaiveDate,
        used_start: NaiveDate,
    },
    /// A historical season was skipped because its start date is not in the data.
    SeasonSkipped { year: i32 },
    /// The single-sine ratio fell outside [-1, 1] and was clamped.
    RatioClamped { date: NaiveDate, ratio: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NormalWindowClipped {
                requested_years,
                requested_start,
                used_start,
            } => write!(
                f,
                "Not enough data to compute normal using requested {requested_years} years \
                 (from {requested_start}); using data from {used_start}"
            ),
            Diagnostic::SeasonSkipped { year } => {
                write!(f, "No data for year {year}; skipping")
            }
            Diagnostic::RatioClamped { date, ratio } => write!(
                f,
                "{date}: (base_temp-avg)/W = {ratio} : should be [-1:1]; clamped"
            ),
        }
    }
}

/// Accumulates diagnostics in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Diagnostics};

    #[test]
    fn test_push_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::SeasonSkipped { year: 2001 });
        diagnostics.push(Diagnostic::SeasonSkipped { year: 2003 });
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.iter().next(),
            Some(&Diagnostic::SeasonSkipped { year: 2001 })
        );
        assert_eq!(
            diagnostics.0[1].to_string(),
            "No data for year 2003; skipping"
        );
    }
}
