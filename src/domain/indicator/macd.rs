//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is defined from index slow-1; signal and histogram from
//! index slow-1 + signal-1.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::{calculate_ema, ema_values, IndicatorSeries, IndicatorType};
use crate::domain::series::PriceSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn validate_periods(fast: usize, slow: usize, signal: usize) -> Result<(), RecommenderError> {
    for (key, value) in [("macd_fast", fast), ("macd_slow", slow), ("macd_signal", signal)] {
        if value == 0 {
            return Err(RecommenderError::invalid_config(
                "indicators",
                key,
                format!("{} must be positive", key),
            ));
        }
    }
    if fast >= slow {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "macd_fast",
            format!("macd_fast ({}) must be less than macd_slow ({})", fast, slow),
        ));
    }
    Ok(())
}

pub fn calculate_macd(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdSeries, RecommenderError> {
    validate_periods(fast, slow, signal_period)?;

    let ema_fast = calculate_ema(series, fast)?;
    let ema_slow = calculate_ema(series, slow)?;

    let line: Vec<Option<f64>> = ema_fast
        .values
        .iter()
        .zip(&ema_slow.values)
        .map(|(f, s)| match (f.value, s.value) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = ema_values(&line, signal_period);

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    let dates = series.dates();
    let line_warmup = slow - 1;
    let signal_warmup = line_warmup + signal_period - 1;

    Ok(MacdSeries {
        line: IndicatorSeries::new(IndicatorType::MacdLine { fast, slow }, &dates, line, line_warmup),
        signal: IndicatorSeries::new(
            IndicatorType::MacdSignal {
                fast,
                slow,
                signal: signal_period,
            },
            &dates,
            signal,
            signal_warmup,
        ),
        histogram: IndicatorSeries::new(
            IndicatorType::MacdHistogram {
                fast,
                slow,
                signal: signal_period,
            },
            &dates,
            histogram,
            signal_warmup,
        ),
    })
}
