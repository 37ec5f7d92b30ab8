//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = X[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) defined inputs.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::series::PriceSeries;

pub fn calculate_ema(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, RecommenderError> {
    if period == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "ema_period",
            "EMA period must be positive",
        ));
    }

    let closes: Vec<Option<f64>> = series.bars().iter().map(|b| Some(b.close)).collect();
    Ok(IndicatorSeries::new(
        IndicatorType::Ema(period),
        &series.dates(),
        ema_values(&closes, period),
        period - 1,
    ))
}

/// EMA over an input that may itself start with an undefined run.
///
/// The seed is the mean of the first `period` defined inputs; every input after
/// the leading `None` run must be defined. `period` must be positive.
pub fn ema_values(input: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; input.len()];
    let Some(start) = input.iter().position(Option::is_some) else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut sum = 0.0;
    let mut ema = 0.0;

    for (offset, value) in input[start..].iter().enumerate() {
        let Some(x) = *value else {
            break;
        };
        let i = start + offset;
        if offset + 1 < period {
            sum += x;
        } else if offset + 1 == period {
            sum += x;
            ema = sum / period as f64;
            out[i] = Some(ema);
        } else {
            ema = x * k + ema * (1.0 - k);
            out[i] = Some(ema);
        }
    }

    out
}
