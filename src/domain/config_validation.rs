//! Configuration building and validation.
//!
//! Every value is validated before the first fetch. Missing keys fall back to
//! documented defaults; present but unparseable values are errors.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::scoring::{ScoringConfig, ScoringWeights};
use crate::domain::universe::{parse_codes, AnalysisConfig};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub codes: Vec<String>,
}

fn parse_value<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, RecommenderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            RecommenderError::invalid_config(section, key, format!("expected {}, got '{}'", expected, raw))
        }),
    }
}

fn parse_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, RecommenderError> {
    parse_value(config, section, key, default, "a non-negative integer")
}

fn parse_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, RecommenderError> {
    parse_value(config, section, key, default, "a number")
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, RecommenderError> {
    let d = IndicatorConfig::default();
    let indicators = IndicatorConfig {
        short_window: parse_usize(config, "indicators", "short_window", d.short_window)?,
        long_window: parse_usize(config, "indicators", "long_window", d.long_window)?,
        rsi_period: parse_usize(config, "indicators", "rsi_period", d.rsi_period)?,
        macd_fast: parse_usize(config, "indicators", "macd_fast", d.macd_fast)?,
        macd_slow: parse_usize(config, "indicators", "macd_slow", d.macd_slow)?,
        macd_signal: parse_usize(config, "indicators", "macd_signal", d.macd_signal)?,
        trend_tolerance: parse_f64(config, "indicators", "trend_tolerance", d.trend_tolerance)?,
        trend_lookback: parse_usize(config, "indicators", "trend_lookback", d.trend_lookback)?,
    };
    indicators.validate()?;
    Ok(indicators)
}

/// A `[weights]` section replaces the default weights wholesale.
pub fn build_weights(config: &dyn ConfigPort) -> Result<ScoringWeights, RecommenderError> {
    let keys = config.keys("weights");
    if keys.is_empty() {
        return Ok(ScoringWeights::default());
    }

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let weight = match config.get_string("weights", &key) {
            Some(_) => parse_f64(config, "weights", &key, 0.0)?,
            None => {
                return Err(RecommenderError::invalid_config(
                    "weights",
                    &key,
                    "weight has no value",
                ));
            }
        };
        entries.push((key, weight));
    }
    ScoringWeights::from_named(entries)
}

pub fn build_scoring_config(config: &dyn ConfigPort) -> Result<ScoringConfig, RecommenderError> {
    let d = ScoringConfig::default();
    let scoring = ScoringConfig {
        weights: build_weights(config)?,
        buy_threshold: parse_f64(config, "scoring", "buy_threshold", d.buy_threshold)?,
        sell_threshold: parse_f64(config, "scoring", "sell_threshold", d.sell_threshold)?,
        confidence_saturation: parse_f64(
            config,
            "scoring",
            "confidence_saturation",
            d.confidence_saturation,
        )?,
        rsi_oversold: parse_f64(config, "scoring", "rsi_oversold", d.rsi_oversold)?,
        rsi_overbought: parse_f64(config, "scoring", "rsi_overbought", d.rsi_overbought)?,
        macd_saturation: parse_f64(config, "scoring", "macd_saturation", d.macd_saturation)?,
    };
    scoring.validate()?;
    Ok(scoring)
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, RecommenderError> {
    Ok(AnalysisConfig {
        indicators: build_indicator_config(config)?,
        scoring: build_scoring_config(config)?,
    })
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, RecommenderError> {
    match config.get_string("data", key) {
        None => Err(RecommenderError::ConfigMissing {
            section: "data".to_string(),
            key: key.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            RecommenderError::invalid_config(
                "data",
                key,
                format!("invalid {} format, expected YYYY-MM-DD", key),
            )
        }),
    }
}

/// Resolves the data section. `codes_override` takes precedence over `[data] codes`.
pub fn build_data_config(
    config: &dyn ConfigPort,
    codes_override: Option<&str>,
) -> Result<DataConfig, RecommenderError> {
    let path = config
        .get_string("data", "path")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RecommenderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })?;

    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date > end_date {
        return Err(RecommenderError::invalid_config(
            "data",
            "start_date",
            "start_date must not be after end_date",
        ));
    }

    let codes_str = match codes_override {
        Some(c) => c.to_string(),
        None => config
            .get_string("data", "codes")
            .ok_or_else(|| RecommenderError::ConfigMissing {
                section: "data".to_string(),
                key: "codes".to_string(),
            })?,
    };
    let codes = parse_codes(&codes_str)
        .map_err(|e| RecommenderError::invalid_config("data", "codes", e.to_string()))?;

    Ok(DataConfig {
        path: PathBuf::from(path.trim()),
        start_date,
        end_date,
        codes,
    })
}
