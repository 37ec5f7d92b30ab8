//! Simple Moving Average and the short/long moving-average pair.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n, maintained with a running sum.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::series::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, RecommenderError> {
    if period == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "window",
            "moving average window must be positive",
        ));
    }

    let bars = series.bars();
    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }
        if i + 1 >= period {
            values.push(Some(window_sum / period as f64));
        } else {
            values.push(None);
        }
    }

    Ok(IndicatorSeries::new(
        IndicatorType::Sma(period),
        &series.dates(),
        values,
        period - 1,
    ))
}

#[derive(Debug, Clone)]
pub struct MovingAverages {
    pub short: IndicatorSeries,
    pub long: IndicatorSeries,
}

pub fn validate_windows(short_window: usize, long_window: usize) -> Result<(), RecommenderError> {
    if short_window == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "short_window",
            "short_window must be positive",
        ));
    }
    if long_window == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "long_window",
            "long_window must be positive",
        ));
    }
    if short_window >= long_window {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "short_window",
            format!(
                "short_window ({}) must be less than long_window ({})",
                short_window, long_window
            ),
        ));
    }
    Ok(())
}

pub fn moving_averages(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<MovingAverages, RecommenderError> {
    validate_windows(short_window, long_window)?;
    Ok(MovingAverages {
        short: calculate_sma(series, short_window)?,
        long: calculate_sma(series, long_window)?,
    })
}
