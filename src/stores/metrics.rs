use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{Quote, UseType};

/// Headline numbers shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_quotes: usize,
    pub today_quotes: usize,
    /// Whole percent; the two shares add up to 100 unless there are no quotes
    pub personal_use_percentage: u32,
    pub others_use_percentage: u32,
}

impl DashboardMetrics {
    pub fn from_quotes(quotes: &[Quote], today: NaiveDate) -> Self {
        let total_quotes = quotes.len();
        if total_quotes == 0 {
            return Self::default();
        }

        let today_quotes = quotes
            .iter()
            .filter(|q| created_on(&q.created_at) == Some(today))
            .count();
        let personal = quotes
            .iter()
            .filter(|q| q.vehicle_info.use_type == UseType::Personal)
            .count();

        let personal_use_percentage =
            ((personal as f64 / total_quotes as f64) * 100.0).round() as u32;

        Self {
            total_quotes,
            today_quotes,
            personal_use_percentage,
            others_use_percentage: 100 - personal_use_percentage,
        }
    }
}

/// Calendar date of a server timestamp, with or without an offset
fn created_on(timestamp: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    timestamp
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}
