//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n bars
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100. If avg_gain == 0 and avg_loss > 0: RSI = 0.
//!
//! Warmup: first n bars are undefined (need n price changes to compute initial average).

use crate::domain::error::RecommenderError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::series::PriceSeries;

pub fn validate_period(period: usize) -> Result<(), RecommenderError> {
    if period == 0 {
        return Err(RecommenderError::invalid_config(
            "indicators",
            "rsi_period",
            "rsi_period must be positive",
        ));
    }
    Ok(())
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, RecommenderError> {
    validate_period(period)?;

    let bars = series.bars();
    let mut values: Vec<Option<f64>> = vec![None; bars.len()];

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i < period {
            gain_sum += gain;
            loss_sum += loss;
        } else if i == period {
            gain_sum += gain;
            loss_sum += loss;
            avg_gain = gain_sum / period as f64;
            avg_loss = loss_sum / period as f64;
            values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
            values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    Ok(IndicatorSeries::new(
        IndicatorType::Rsi(period),
        &series.dates(),
        values,
        period,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::series::{normalize, RawSeries};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect();
        normalize(RawSeries::new("TEST", bars)).unwrap()
    }

    #[test]
    fn rsi_single_bar() {
        let series = make_series(&[100.0]);
        let rsi = calculate_rsi(&series, 14).unwrap();
        assert_eq!(rsi.len(), 1);
        assert_eq!(rsi.latest(), None);
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let rsi = calculate_rsi(&make_series(&prices), 14).unwrap();

        assert_eq!(rsi.len(), 15);
        for i in 0..14 {
            assert_eq!(rsi.get(i), None, "Bar {} should be undefined", i);
        }
        assert!(rsi.get(14).is_some(), "Bar 14 should be defined");
        assert!(matches!(
            rsi.value_at(13),
            Err(RecommenderError::InsufficientHistory { first_defined: 14, .. })
        ));
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&make_series(&prices), 14).unwrap();
        for i in 14..30 {
            assert_relative_eq!(rsi.get(i).unwrap(), 100.0);
        }
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&make_series(&prices), 14).unwrap();
        for i in 14..30 {
            assert_relative_eq!(rsi.get(i).unwrap(), 0.0);
        }
    }

    #[test]
    fn rsi_flat_prices_report_100() {
        let rsi = calculate_rsi(&make_series(&[50.0; 20]), 14).unwrap();
        assert_relative_eq!(rsi.latest().unwrap(), 100.0);
    }

    #[test]
    fn rsi_seed_matches_hand_calculation() {
        // changes: +2, -1, +3 -> avg_gain 5/3, avg_loss 1/3, RS 5
        let rsi = calculate_rsi(&make_series(&[10.0, 12.0, 11.0, 14.0]), 3).unwrap();
        assert_relative_eq!(rsi.get(3).unwrap(), 100.0 - 100.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // seed as above, then change -2: avg_gain = (5/3*2 + 0)/3, avg_loss = (1/3*2 + 2)/3
        let rsi = calculate_rsi(&make_series(&[10.0, 12.0, 11.0, 14.0, 12.0]), 3).unwrap();
        let avg_gain = (5.0 / 3.0 * 2.0) / 3.0;
        let avg_loss = (1.0 / 3.0 * 2.0 + 2.0) / 3.0;
        let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert_relative_eq!(rsi.get(4).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn rsi_known_calculation() {
        let prices = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let rsi = calculate_rsi(&make_series(&prices), 14).unwrap();
        let value = rsi.get(14).unwrap();
        assert!(value > 50.0 && value < 100.0, "RSI should be in bullish territory");
    }

    #[test]
    fn rsi_indicator_type() {
        let rsi = calculate_rsi(&make_series(&[100.0]), 14).unwrap();
        assert_eq!(rsi.indicator_type, IndicatorType::Rsi(14));
    }

    #[test]
    fn rsi_zero_period_fails() {
        let series = make_series(&[100.0, 101.0]);
        assert!(matches!(
            calculate_rsi(&series, 0),
            Err(RecommenderError::InvalidConfiguration { .. })
        ));
    }

    proptest! {
        #[test]
        fn rsi_always_in_range(
            prices in prop::collection::vec(1.0f64..500.0, 1..100),
            period in 1usize..30,
        ) {
            let rsi = calculate_rsi(&make_series(&prices), period).unwrap();
            prop_assert_eq!(rsi.defined_count(), prices.len().saturating_sub(period));
            for value in rsi.to_options().into_iter().flatten() {
                prop_assert!((0.0..=100.0).contains(&value), "RSI {} out of range", value);
            }
        }
    }
}
