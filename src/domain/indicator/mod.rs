//! Technical indicator implementations.
//!
//! Every indicator produces one point per input bar. Points inside the warmup
//! run carry `None`; once the warmup is over every point is defined.
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//! - `IndicatorConfig`: Window/period parameters shared by the engine

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod trend;

pub use ema::{calculate_ema, ema_values};
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, moving_averages, MovingAverages};
pub use trend::{classify_trend, Trend, TrendPoint};

use crate::domain::error::RecommenderError;
use chrono::NaiveDate;
use std::fmt;

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_TREND_TOLERANCE: f64 = 0.01;
pub const DEFAULT_TREND_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    MacdLine {
        fast: usize,
        slow: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdHistogram {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
    /// Index of the first bar that can carry a value, given enough bars.
    warmup: usize,
}

impl IndicatorSeries {
    pub(crate) fn new(
        indicator_type: IndicatorType,
        dates: &[NaiveDate],
        values: Vec<Option<f64>>,
        warmup: usize,
    ) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        let values = dates
            .iter()
            .zip(values)
            .map(|(&date, value)| IndicatorPoint { date, value })
            .collect();
        Self {
            indicator_type,
            values,
            warmup,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// Value of the most recent bar, `None` while still warming up.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn to_options(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    /// Demands a defined value at `index`.
    ///
    /// Fails with `InsufficientHistory` when the position lies in the warmup
    /// run or beyond the end of the series.
    pub fn value_at(&self, index: usize) -> Result<f64, RecommenderError> {
        self.get(index)
            .ok_or_else(|| RecommenderError::InsufficientHistory {
                indicator: self.indicator_type.to_string(),
                index,
                first_defined: self.warmup,
            })
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::MacdLine { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdHistogram { fast, slow, signal } => {
                write!(f, "MACD_HIST({},{},{})", fast, slow, signal)
            }
        }
    }
}

/// Parameters for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub trend_tolerance: f64,
    pub trend_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            rsi_period: DEFAULT_RSI_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            trend_tolerance: DEFAULT_TREND_TOLERANCE,
            trend_lookback: DEFAULT_TREND_LOOKBACK,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), RecommenderError> {
        sma::validate_windows(self.short_window, self.long_window)?;
        rsi::validate_period(self.rsi_period)?;
        macd::validate_periods(self.macd_fast, self.macd_slow, self.macd_signal)?;
        trend::validate_params(self.trend_tolerance, self.trend_lookback)?;
        Ok(())
    }
}
