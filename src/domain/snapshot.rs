//! Per-instrument indicator snapshot as of the most recent bar.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::{
    calculate_macd, calculate_rsi, classify_trend, moving_averages, IndicatorConfig, Trend,
};
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub code: String,
    pub as_of: NaiveDate,
    pub close: f64,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    /// Moving averages one bar earlier, for crossover detection.
    pub prev_short_ma: Option<f64>,
    pub prev_long_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
    pub macd_histogram: Option<f64>,
    /// Histogram one bar earlier, for sign-flip detection.
    pub prev_macd_histogram: Option<f64>,
    pub trend: Trend,
}

impl IndicatorSnapshot {
    pub fn compute(series: &PriceSeries, config: &IndicatorConfig) -> Result<Self, RecommenderError> {
        let mas = moving_averages(series, config.short_window, config.long_window)?;
        let rsi = calculate_rsi(series, config.rsi_period)?;
        let macd = calculate_macd(series, config.macd_fast, config.macd_slow, config.macd_signal)?;
        let trends = classify_trend(&mas, config.trend_tolerance, config.trend_lookback)?;

        let last_bar = series.last();
        let last = series.len() - 1;
        let prev = last.checked_sub(1);

        Ok(Self {
            code: series.code().to_string(),
            as_of: last_bar.date,
            close: last_bar.close,
            short_ma: mas.short.get(last),
            long_ma: mas.long.get(last),
            prev_short_ma: prev.and_then(|i| mas.short.get(i)),
            prev_long_ma: prev.and_then(|i| mas.long.get(i)),
            rsi: rsi.get(last),
            macd_line: macd.line.get(last),
            signal_line: macd.signal.get(last),
            macd_histogram: macd.histogram.get(last),
            prev_macd_histogram: prev.and_then(|i| macd.histogram.get(i)),
            trend: trends.last().map(|p| p.trend).unwrap_or(Trend::Unknown),
        })
    }
}
