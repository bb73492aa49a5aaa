//! Filtering raw forecast entries down to the display window.
//!
//! Raw entries are never modified. Normalizing produces [`ForecastDisplay`]
//! records, so the same decoded reading can be normalized again against a
//! different reference date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ForecastBlock, ForecastDayEntry, Pollutant};

/// Days kept before the reference date.
pub const DAYS_BEFORE: i64 = 2;
/// Days kept after the reference date.
pub const DAYS_AFTER: i64 = 3;

const RAW_DAY_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DAY_FORMAT: &str = "%B %d, %Y";
const WEEKDAY_FORMAT: &str = "%A";

/// A forecast entry ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDisplay {
    pub date: NaiveDate,
    /// Long-form date, e.g. `"June 05, 2024"`.
    pub day: String,
    /// Full weekday name, e.g. `"Wednesday"`.
    pub weekday: String,
    pub average: i64,
    pub max: i64,
    pub min: i64,
}

/// Inclusive date range `[reference - 2 days, reference + 3 days]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ForecastWindow {
    pub fn around(reference: NaiveDate) -> Self {
        Self {
            start: reference - Duration::days(DAYS_BEFORE),
            end: reference + Duration::days(DAYS_AFTER),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keep entries inside the window around `reference`, in input order.
///
/// Entries whose `day` isn't a `yyyy-MM-dd` date are dropped.
pub fn normalize(entries: &[ForecastDayEntry], reference: NaiveDate) -> Vec<ForecastDisplay> {
    let window = ForecastWindow::around(reference);

    entries
        .iter()
        .filter_map(|entry| {
            let date = match NaiveDate::parse_from_str(&entry.day, RAW_DAY_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    debug!(day = %entry.day, error = %e, "dropping forecast entry with unparseable day");
                    return None;
                }
            };

            window.contains(date).then(|| ForecastDisplay {
                date,
                day: date.format(DISPLAY_DAY_FORMAT).to_string(),
                weekday: date.format(WEEKDAY_FORMAT).to_string(),
                average: entry.average,
                max: entry.max,
                min: entry.min,
            })
        })
        .collect()
}

/// The three pollutant sequences after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub o3: Vec<ForecastDisplay>,
    pub pm10: Vec<ForecastDisplay>,
    pub pm25: Vec<ForecastDisplay>,
}

impl NormalizedForecast {
    pub fn entries(&self, pollutant: Pollutant) -> &[ForecastDisplay] {
        match pollutant {
            Pollutant::Ozone => &self.o3,
            Pollutant::Pm10 => &self.pm10,
            Pollutant::Pm25 => &self.pm25,
        }
    }
}

impl ForecastBlock {
    /// Normalize each pollutant sequence independently.
    pub fn normalize(&self, reference: NaiveDate) -> NormalizedForecast {
        NormalizedForecast {
            o3: normalize(&self.o3, reference),
            pm10: normalize(&self.pm10, reference),
            pm25: normalize(&self.pm25, reference),
        }
    }
}
