//! Mood summary: average, advice and chart series for the home screen.

use serde::{Serialize, Serializer};

use crate::models::mood::{ChartSeries, MoodEntry};

pub const RELAX_ADVICE: &str = "Try to relax and take a short walk.";
pub const MAINTAIN_ADVICE: &str = "Keep up the good work! How about some meditation?";
pub const POSITIVE_ADVICE: &str =
    "You're doing great! Maybe try a new hobby or spend time with friends.";

/// Mean mood rounded to one decimal, or `NotAvailable` for no data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoodAverage {
    Available(f64),
    NotAvailable,
}

impl MoodAverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            MoodAverage::Available(v) => Some(*v),
            MoodAverage::NotAvailable => None,
        }
    }
}

impl Serialize for MoodAverage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MoodAverage::Available(v) => serializer.serialize_f64(*v),
            MoodAverage::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

pub fn average(values: &[i32]) -> MoodAverage {
    if values.is_empty() {
        return MoodAverage::NotAvailable;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let mean = sum as f64 / values.len() as f64;
    MoodAverage::Available((mean * 10.0).round() / 10.0)
}

/// Boundaries 4 and 7 belong to the middle band. No data gets the middle band too.
pub fn advice(average: MoodAverage) -> &'static str {
    match average {
        MoodAverage::Available(v) if v < 4.0 => RELAX_ADVICE,
        MoodAverage::Available(v) if v <= 7.0 => MAINTAIN_ADVICE,
        MoodAverage::Available(_) => POSITIVE_ADVICE,
        MoodAverage::NotAvailable => MAINTAIN_ADVICE,
    }
}

/// Chronological series, one point per entry, labelled by date.
pub fn chart_series(entries: &[MoodEntry]) -> ChartSeries {
    let mut sorted: Vec<&MoodEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    ChartSeries {
        labels: sorted
            .iter()
            .map(|e| e.timestamp.format("%Y-%m-%d").to_string())
            .collect(),
        values: sorted.iter().map(|e| e.mood_level).collect(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodSummary {
    pub count: usize,
    pub average: MoodAverage,
    pub advice: &'static str,
    pub chart: ChartSeries,
}

pub fn summarize(entries: &[MoodEntry]) -> MoodSummary {
    let levels: Vec<i32> = entries.iter().map(|e| e.mood_level).collect();
    let average = average(&levels);
    MoodSummary {
        count: entries.len(),
        average,
        advice: advice(average),
        chart: chart_series(entries),
    }
}
