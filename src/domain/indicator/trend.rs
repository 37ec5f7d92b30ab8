//! Trend classification from the short/long moving-average pair.
//!
//! For bar i with lookback k and relative tolerance t:
//! - any of short[i], long[i], short[i-k], long[i-k] undefined → Unknown
//! - |short - long| / long <= t → Sideways
//! - short > long, both rising over k bars → Uptrend
//! - short < long, both falling over k bars → Downtrend
//! - anything else → Sideways

use crate::domain::error::RecommenderError;
use crate::domain::indicator::MovingAverages;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
    Unknown,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trend::Uptrend => "Uptrend",
            Trend::Downtrend => "Downtrend",
            Trend::Sideways => "Sideways",
            Trend::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub trend: Trend,
}

pub fn validate_params(tolerance: f64, lookback: usize) -> Result<(), RecommenderError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "trend_tolerance",
            "trend_tolerance must be a non-negative number",
        ));
    }
    if lookback == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "trend_lookback",
            "trend_lookback must be at least 1",
        ));
    }
    Ok(())
}

fn classify_at(mas: &MovingAverages, i: usize, tolerance: f64, lookback: usize) -> Trend {
    if i < lookback {
        return Trend::Unknown;
    }
    let (Some(short), Some(long), Some(short_prev), Some(long_prev)) = (
        mas.short.get(i),
        mas.long.get(i),
        mas.short.get(i - lookback),
        mas.long.get(i - lookback),
    ) else {
        return Trend::Unknown;
    };

    if (short - long).abs() <= tolerance * long.abs() {
        return Trend::Sideways;
    }

    let rising = short > short_prev && long > long_prev;
    let falling = short < short_prev && long < long_prev;

    if short > long && rising {
        Trend::Uptrend
    } else if short < long && falling {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

pub fn classify_trend(
    mas: &MovingAverages,
    tolerance: f64,
    lookback: usize,
) -> Result<Vec<TrendPoint>, RecommenderError> {
    validate_params(tolerance, lookback)?;

    Ok(mas
        .short
        .values
        .iter()
        .enumerate()
        .map(|(i, point)| TrendPoint {
            date: point.date,
            trend: classify_at(mas, i, tolerance, lookback),
        })
        .collect())
}
