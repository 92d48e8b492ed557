use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Length of the trailing review window, and of each side of the calendar range.
pub const REVIEW_WINDOW_DAYS: i64 = 15;

const LONG_DATE_FORMAT: &str = "%B %d, %Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a human-readable date such as `September 1, 2025`.
pub fn parse_long_date(input: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(input.trim(), LONG_DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDateFormat(input.to_string()))
}

pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), ISO_DATE_FORMAT).ok()
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Calendar span shown around today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
    pub today: String,
}

impl DateRange {
    pub fn around(today: NaiveDate, days: i64) -> Self {
        Self {
            start_date: to_iso(today - Duration::days(days)),
            end_date: to_iso(today + Duration::days(days)),
            today: to_iso(today),
        }
    }

    pub fn current() -> Self {
        Self::around(Local::now().date_naive(), REVIEW_WINDOW_DAYS)
    }
}
