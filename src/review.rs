//! Completion statistics over the trailing review window.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{REVIEW_WINDOW_DAYS, parse_iso_date, to_iso};
use crate::event_type::EventTypeTable;
use crate::todo::TodoMap;

/// Uncompleted rate (in percent) at or above which a type is reported.
pub const HIGH_FREQUENCY_UNCOMPLETED_RATE: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPeriod {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTypeStats {
    pub total: usize,
    pub completed: usize,
    pub uncompleted: usize,
    pub completion_rate: f64,
    pub uncompleted_rate: f64,
    /// Display name; absent for types the table does not know.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighFrequencyType {
    #[serde(rename = "type")]
    pub event_type: String,
    pub name: String,
    pub uncompleted_count: usize,
    pub total: usize,
    pub completion_rate: f64,
    pub uncompleted_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub period: ReviewPeriod,
    pub total_todos: usize,
    pub completed_todos: usize,
    pub completion_rate: f64,
    pub event_type_stats: BTreeMap<String, EventTypeStats>,
    pub high_frequency_uncompleted: Vec<HighFrequencyType>,
}

/// Summarise every bucket dated within `[now - 15 days, now]`, both ends
/// inclusive by calendar day.
///
/// Every known event type appears in the per-type stats, with zero counts if
/// unused. Unknown keys found on items are tracked under their literal key.
pub fn generate_review(todos: &TodoMap, event_types: &EventTypeTable, now: NaiveDateTime) -> ReviewReport {
    let end = now.date();
    let start = (now - Duration::days(REVIEW_WINDOW_DAYS)).date();

    let mut stats: BTreeMap<String, EventTypeStats> = event_types
        .iter()
        .map(|t| (t.key.clone(), EventTypeStats::default()))
        .collect();
    let mut total_todos = 0;
    let mut completed_todos = 0;

    for (date, items) in todos {
        let Some(day) = parse_iso_date(date) else {
            log::warn!("skipping bucket with malformed date '{date}'");
            continue;
        };
        if day < start || day > end {
            continue;
        }
        for item in items {
            total_todos += 1;
            let entry = stats.entry(item.event_type().to_string()).or_default();
            entry.total += 1;
            if item.completed() {
                completed_todos += 1;
                entry.completed += 1;
            } else {
                entry.uncompleted += 1;
            }
        }
    }

    for (key, entry) in stats.iter_mut() {
        entry.completion_rate = percentage(entry.completed, entry.total);
        entry.uncompleted_rate = percentage(entry.uncompleted, entry.total);
        if let Some(known) = event_types.get(key) {
            entry.name = Some(known.name.clone());
            entry.priority = Some(known.priority);
        }
    }

    let high_frequency_uncompleted = high_frequency_uncompleted(&stats);

    ReviewReport {
        period: ReviewPeriod {
            start_date: to_iso(start),
            end_date: to_iso(end),
        },
        total_todos,
        completed_todos,
        completion_rate: percentage(completed_todos, total_todos),
        event_type_stats: stats,
        high_frequency_uncompleted,
    }
}

/// Types at or above the threshold, worst first. Equal rates order by known
/// priority, unknown types after known ones, then by key.
fn high_frequency_uncompleted(stats: &BTreeMap<String, EventTypeStats>) -> Vec<HighFrequencyType> {
    let mut flagged: Vec<(&String, &EventTypeStats)> = stats
        .iter()
        .filter(|(_, s)| s.total > 0 && s.uncompleted_rate >= HIGH_FREQUENCY_UNCOMPLETED_RATE)
        .collect();

    flagged.sort_by(|(key_a, a), (key_b, b)| {
        b.uncompleted_rate
            .total_cmp(&a.uncompleted_rate)
            .then_with(|| compare_priority(a.priority, b.priority))
            .then_with(|| key_a.cmp(key_b))
    });

    flagged
        .into_iter()
        .map(|(key, s)| HighFrequencyType {
            event_type: key.clone(),
            name: s.name.clone().unwrap_or_else(|| key.clone()),
            uncompleted_count: s.uncompleted,
            total: s.total,
            completion_rate: s.completion_rate,
            uncompleted_rate: s.uncompleted_rate,
        })
        .collect()
}

fn compare_priority(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `part / total * 100` rounded to two decimals; zero when `total` is zero.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = part as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
