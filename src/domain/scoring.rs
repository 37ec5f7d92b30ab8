//! Scoring of an indicator snapshot into a recommendation.
//!
//! Each category maps its inputs to a sub-score in [-1, +1]:
//! - moving_average: +1 on a short-over-long crossover at the last bar, -1 on a
//!   crossunder, 0 otherwise
//! - rsi: +1 at or below `rsi_oversold`, -1 at or above `rsi_overbought`,
//!   linear in between
//! - macd: non-zero only when the histogram changes sign between the previous
//!   and the last bar; +/-(0.5 + 0.5 * min(|histogram| / (close * macd_saturation), 1))
//! - trend: Uptrend +1, Downtrend -1, Sideways 0
//!
//! Categories whose inputs are undefined are dropped from both the weighted sum
//! and the normalizing sum of absolute weights.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::Trend;
use crate::domain::snapshot::IndicatorSnapshot;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_BUY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_SELL_THRESHOLD: f64 = -0.3;
pub const DEFAULT_CONFIDENCE_SATURATION: f64 = 0.75;
pub const DEFAULT_RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_MACD_SATURATION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    MovingAverage,
    Rsi,
    Macd,
    Trend,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MovingAverage,
        Category::Rsi,
        Category::Macd,
        Category::Trend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::MovingAverage => "moving_average",
            Category::Rsi => "rsi",
            Category::Macd => "macd",
            Category::Trend => "trend",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "moving_average" | "ma" | "sma" => Some(Category::MovingAverage),
            "rsi" => Some(Category::Rsi),
            "macd" => Some(Category::Macd),
            "trend" => Some(Category::Trend),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.write_str(name)
    }
}

/// Category weights. Categories absent from the map carry weight 0 and are
/// not used.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    weights: BTreeMap<Category, f64>,
}

impl ScoringWeights {
    /// Builds weights from configuration names. Unknown names and non-finite
    /// weights fail with `InvalidConfiguration`.
    pub fn from_named<I, S>(entries: I) -> Result<Self, RecommenderError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = BTreeMap::new();
        for (name, weight) in entries {
            let name = name.as_ref();
            let category = Category::from_name(name).ok_or_else(|| {
                RecommenderError::invalid_config(
                    "weights",
                    name,
                    format!(
                        "unknown indicator category (expected one of: {})",
                        Category::ALL.map(|c| c.name()).join(", ")
                    ),
                )
            })?;
            if !weight.is_finite() {
                return Err(RecommenderError::invalid_config(
                    "weights",
                    name,
                    "weight must be a finite number",
                ));
            }
            if weights.insert(category, weight).is_some() {
                return Err(RecommenderError::invalid_config(
                    "weights",
                    name,
                    format!("weight for {} given more than once", category),
                ));
            }
        }
        Ok(Self { weights })
    }

    pub fn get(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }

    /// Categories with a non-zero weight.
    pub fn used(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights
            .iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(c, w)| (*c, *w))
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weights: Category::ALL.iter().map(|c| (*c, 1.0)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    /// |score| at which confidence reaches 1.0 with full data.
    pub confidence_saturation: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Histogram size, as a fraction of the close, at which a MACD sign flip scores +/-1.
    pub macd_saturation: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            buy_threshold: DEFAULT_BUY_THRESHOLD,
            sell_threshold: DEFAULT_SELL_THRESHOLD,
            confidence_saturation: DEFAULT_CONFIDENCE_SATURATION,
            rsi_oversold: DEFAULT_RSI_OVERSOLD,
            rsi_overbought: DEFAULT_RSI_OVERBOUGHT,
            macd_saturation: DEFAULT_MACD_SATURATION,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), RecommenderError> {
        if !self.buy_threshold.is_finite() || !self.sell_threshold.is_finite() {
            return Err(RecommenderError::invalid_config(
                "scoring",
                "buy_threshold",
                "thresholds must be finite numbers",
            ));
        }
        if self.buy_threshold <= self.sell_threshold {
            return Err(RecommenderError::invalid_config(
                "scoring",
                "buy_threshold",
                format!(
                    "buy_threshold ({}) must be greater than sell_threshold ({})",
                    self.buy_threshold, self.sell_threshold
                ),
            ));
        }
        if !(self.confidence_saturation.is_finite() && self.confidence_saturation > 0.0) {
            return Err(RecommenderError::invalid_config(
                "scoring",
                "confidence_saturation",
                "confidence_saturation must be positive",
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(RecommenderError::invalid_config(
                "scoring",
                "rsi_oversold",
                "require 0 <= rsi_oversold < rsi_overbought <= 100",
            ));
        }
        if !(self.macd_saturation.is_finite() && self.macd_saturation > 0.0) {
            return Err(RecommenderError::invalid_config(
                "scoring",
                "macd_saturation",
                "macd_saturation must be positive",
            ));
        }
        if self.weights.used().next().is_none() {
            return Err(RecommenderError::invalid_config(
                "weights",
                "*",
                "at least one category needs a non-zero weight",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub code: String,
    pub as_of: NaiveDate,
    pub action: Action,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub score: f64,
}

/// A category's sub-score together with its human-readable factor.
struct Signal {
    category: Category,
    sub_score: f64,
    description: String,
}

fn moving_average_signal(snapshot: &IndicatorSnapshot) -> Option<Signal> {
    let short = snapshot.short_ma?;
    let long = snapshot.long_ma?;
    let prev_short = snapshot.prev_short_ma?;
    let prev_long = snapshot.prev_long_ma?;

    let (sub_score, description) = if prev_short <= prev_long && short > long {
        (
            1.0,
            format!("short MA crossed above long MA ({:.2} > {:.2})", short, long),
        )
    } else if prev_short >= prev_long && short < long {
        (
            -1.0,
            format!("short MA crossed below long MA ({:.2} < {:.2})", short, long),
        )
    } else {
        (0.0, String::new())
    };

    Some(Signal {
        category: Category::MovingAverage,
        sub_score,
        description,
    })
}

fn rsi_signal(snapshot: &IndicatorSnapshot, config: &ScoringConfig) -> Option<Signal> {
    let rsi = snapshot.rsi?;
    let (low, high) = (config.rsi_oversold, config.rsi_overbought);

    let (sub_score, description) = if rsi <= low {
        (1.0, format!("RSI {:.1} oversold", rsi))
    } else if rsi >= high {
        (-1.0, format!("RSI {:.1} overbought", rsi))
    } else {
        let sub = 1.0 - 2.0 * (rsi - low) / (high - low);
        let leaning = if sub >= 0.0 { "leaning oversold" } else { "leaning overbought" };
        (sub, format!("RSI {:.1} {}", rsi, leaning))
    };

    Some(Signal {
        category: Category::Rsi,
        sub_score,
        description,
    })
}

/// Histograms within this fraction of the close count as zero.
const MACD_ZERO_BAND: f64 = 1e-9;

fn histogram_sign(histogram: f64, close: f64) -> i8 {
    if histogram.abs() <= close * MACD_ZERO_BAND {
        0
    } else if histogram > 0.0 {
        1
    } else {
        -1
    }
}

fn macd_signal(snapshot: &IndicatorSnapshot, config: &ScoringConfig) -> Option<Signal> {
    let histogram = snapshot.macd_histogram?;
    let prev_histogram = snapshot.prev_macd_histogram?;

    let sign = histogram_sign(histogram, snapshot.close);
    let prev_sign = histogram_sign(prev_histogram, snapshot.close);
    let direction = if prev_sign <= 0 && sign > 0 {
        1.0
    } else if prev_sign >= 0 && sign < 0 {
        -1.0
    } else {
        return Some(Signal {
            category: Category::Macd,
            sub_score: 0.0,
            description: String::new(),
        });
    };

    // magnitude only scales the flip within [0.5, 1]
    let strength = (histogram.abs() / (snapshot.close * config.macd_saturation)).min(1.0);
    let side = if direction > 0.0 { "above" } else { "below" };

    Some(Signal {
        category: Category::Macd,
        sub_score: direction * (0.5 + 0.5 * strength),
        description: format!(
            "MACD histogram {:+.3} crossed {} zero (was {:+.3})",
            histogram, side, prev_histogram
        ),
    })
}

fn trend_signal(snapshot: &IndicatorSnapshot) -> Option<Signal> {
    let sub_score = match snapshot.trend {
        Trend::Uptrend => 1.0,
        Trend::Downtrend => -1.0,
        Trend::Sideways => 0.0,
        Trend::Unknown => return None,
    };
    Some(Signal {
        category: Category::Trend,
        sub_score,
        description: format!("trend {}", snapshot.trend),
    })
}

fn signal_for(category: Category, snapshot: &IndicatorSnapshot, config: &ScoringConfig) -> Option<Signal> {
    match category {
        Category::MovingAverage => moving_average_signal(snapshot),
        Category::Rsi => rsi_signal(snapshot, config),
        Category::Macd => macd_signal(snapshot, config),
        Category::Trend => trend_signal(snapshot),
    }
}

pub fn score(
    snapshot: &IndicatorSnapshot,
    config: &ScoringConfig,
) -> Result<Recommendation, RecommenderError> {
    config.validate()?;

    let used: Vec<(Category, f64)> = config.weights.used().collect();
    let weighted: Vec<(Signal, f64)> = used
        .iter()
        .filter_map(|&(category, weight)| {
            signal_for(category, snapshot, config).map(|signal| (signal, weight))
        })
        .collect();

    let weight_sum: f64 = weighted.iter().map(|(_, w)| w.abs()).sum();

    if weighted.is_empty() || weight_sum == 0.0 {
        return Ok(Recommendation {
            code: snapshot.code.clone(),
            as_of: snapshot.as_of,
            action: Action::Hold,
            confidence: 0.0,
            reasoning: Vec::new(),
            score: 0.0,
        });
    }

    let mut contributions: Vec<(Signal, f64)> = weighted
        .into_iter()
        .map(|(signal, weight)| {
            let contribution = weight * signal.sub_score / weight_sum;
            (signal, contribution)
        })
        .collect();

    let total: f64 = contributions.iter().map(|(_, c)| c).sum();
    // a negative weight on a zero sub-score yields -0.0
    let total = if total == 0.0 { 0.0 } else { total };
    let coverage = contributions.len() as f64 / used.len() as f64;

    let action = if total >= config.buy_threshold {
        Action::Buy
    } else if total <= config.sell_threshold {
        Action::Sell
    } else {
        Action::Hold
    };
    let confidence = (total.abs() / config.confidence_saturation).min(1.0) * coverage;

    contributions.sort_by(|(a, ca), (b, cb)| {
        cb.abs()
            .total_cmp(&ca.abs())
            .then(a.category.cmp(&b.category))
    });
    let reasoning = contributions
        .iter()
        .filter(|(_, c)| *c != 0.0)
        .map(|(signal, c)| format!("{} [{} {:+.3}]", signal.description, signal.category, c))
        .collect();

    Ok(Recommendation {
        code: snapshot.code.clone(),
        as_of: snapshot.as_of,
        action,
        confidence,
        reasoning,
        score: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn empty_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            code: "2330".into(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            close: 100.0,
            short_ma: None,
            long_ma: None,
            prev_short_ma: None,
            prev_long_ma: None,
            rsi: None,
            macd_line: None,
            signal_line: None,
            macd_histogram: None,
            prev_macd_histogram: None,
            trend: Trend::Unknown,
        }
    }

    fn full_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            short_ma: Some(101.0),
            long_ma: Some(100.0),
            prev_short_ma: Some(99.5),
            prev_long_ma: Some(100.0),
            rsi: Some(25.0),
            macd_line: Some(1.5),
            signal_line: Some(0.5),
            macd_histogram: Some(1.0),
            prev_macd_histogram: Some(-0.2),
            trend: Trend::Uptrend,
            ..empty_snapshot()
        }
    }

    fn weights(entries: &[(&str, f64)]) -> ScoringWeights {
        ScoringWeights::from_named(entries.iter().copied()).unwrap()
    }

    #[test]
    fn no_defined_inputs_is_hold_with_zero_confidence() {
        let rec = score(&empty_snapshot(), &ScoringConfig::default()).unwrap();
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.score, 0.0);
        assert!(rec.reasoning.is_empty());
        assert_eq!(rec.code, "2330");
    }

    #[test]
    fn all_bullish_signals_buy_with_full_confidence() {
        let rec = score(&full_snapshot(), &ScoringConfig::default()).unwrap();
        assert_relative_eq!(rec.score, 1.0);
        assert_eq!(rec.action, Action::Buy);
        assert_relative_eq!(rec.confidence, 1.0);
        assert_eq!(rec.reasoning.len(), 4);
    }

    #[test]
    fn all_bearish_signals_sell() {
        let snapshot = IndicatorSnapshot {
            short_ma: Some(99.0),
            long_ma: Some(100.0),
            prev_short_ma: Some(100.5),
            prev_long_ma: Some(100.0),
            rsi: Some(80.0),
            macd_histogram: Some(-2.0),
            prev_macd_histogram: Some(0.5),
            trend: Trend::Downtrend,
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert_relative_eq!(rec.score, -1.0);
        assert_eq!(rec.action, Action::Sell);
    }

    #[test]
    fn rsi_interpolates_linearly() {
        let config = ScoringConfig {
            weights: weights(&[("rsi", 1.0)]),
            ..ScoringConfig::default()
        };
        for (rsi, expected) in [(30.0, 1.0), (40.0, 0.5), (50.0, 0.0), (60.0, -0.5), (70.0, -1.0)] {
            let snapshot = IndicatorSnapshot {
                rsi: Some(rsi),
                ..empty_snapshot()
            };
            let rec = score(&snapshot, &config).unwrap();
            assert_relative_eq!(rec.score, expected, epsilon = 1e-12);
        }
    }

    fn macd_only() -> ScoringConfig {
        ScoringConfig {
            weights: weights(&[("macd", 1.0)]),
            ..ScoringConfig::default()
        }
    }

    fn with_histogram(prev: f64, last: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            macd_histogram: Some(last),
            prev_macd_histogram: Some(prev),
            ..empty_snapshot()
        }
    }

    #[test]
    fn macd_sign_flip_scales_with_histogram() {
        // saturation: 1% of close 100 = 1.0
        let rec = score(&with_histogram(-0.1, 0.5), &macd_only()).unwrap();
        assert_relative_eq!(rec.score, 0.75);
        assert_eq!(rec.action, Action::Buy);
        assert!(rec.reasoning[0].starts_with("MACD histogram +0.500 crossed above zero"));

        let rec = score(&with_histogram(0.2, -3.0), &macd_only()).unwrap();
        assert_relative_eq!(rec.score, -1.0);
        assert_eq!(rec.action, Action::Sell);

        // leaving exactly zero counts as a flip
        let rec = score(&with_histogram(0.0, 0.01), &macd_only()).unwrap();
        assert_relative_eq!(rec.score, 0.505, epsilon = 1e-12);
    }

    #[test]
    fn macd_without_sign_flip_scores_zero() {
        for (prev, last) in [(0.3, 0.8), (-0.4, -2.0), (0.5, 0.0), (0.0, 0.0)] {
            let rec = score(&with_histogram(prev, last), &macd_only()).unwrap();
            assert_eq!(rec.score, 0.0, "prev {} last {}", prev, last);
            assert_eq!(rec.action, Action::Hold);
            assert!(rec.reasoning.is_empty());
        }
    }

    #[test]
    fn macd_float_noise_is_not_a_flip() {
        let rec = score(&with_histogram(-1e-13, 1e-13), &macd_only()).unwrap();
        assert_eq!(rec.score, 0.0);
    }

    #[test]
    fn macd_needs_previous_histogram() {
        let snapshot = IndicatorSnapshot {
            macd_histogram: Some(0.8),
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &macd_only()).unwrap();
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.confidence, 0.0);
    }

    #[test]
    fn no_crossover_gives_zero_ma_sub_score() {
        let config = ScoringConfig {
            weights: weights(&[("ma", 1.0)]),
            ..ScoringConfig::default()
        };
        let snapshot = IndicatorSnapshot {
            short_ma: Some(105.0),
            long_ma: Some(100.0),
            prev_short_ma: Some(104.0),
            prev_long_ma: Some(100.0),
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &config).unwrap();
        assert_eq!(rec.score, 0.0);
        assert_eq!(rec.action, Action::Hold);
        assert!(rec.reasoning.is_empty());
        // the category had data, so coverage is full but |score| is zero
        assert_eq!(rec.confidence, 0.0);
    }

    #[test]
    fn undefined_categories_are_excluded_not_zero_filled() {
        // only RSI defined: score is RSI's sub-score alone, not diluted by the others
        let snapshot = IndicatorSnapshot {
            rsi: Some(20.0),
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert_relative_eq!(rec.score, 1.0);
        assert_eq!(rec.action, Action::Buy);
        // one of four used categories available
        assert_relative_eq!(rec.confidence, 0.25);
    }

    #[test]
    fn partial_data_never_more_confident_than_full_data() {
        let full = score(&full_snapshot(), &ScoringConfig::default()).unwrap();
        let partial = score(
            &IndicatorSnapshot {
                macd_histogram: None,
                trend: Trend::Unknown,
                ..full_snapshot()
            },
            &ScoringConfig::default(),
        )
        .unwrap();
        assert!(partial.confidence <= full.confidence);
        assert_relative_eq!(partial.confidence, 0.5);
    }

    #[test]
    fn negative_weight_penalizes() {
        let config = ScoringConfig {
            weights: weights(&[("rsi", 1.0), ("trend", -1.0)]),
            ..ScoringConfig::default()
        };
        let snapshot = IndicatorSnapshot {
            rsi: Some(50.0),
            trend: Trend::Uptrend,
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &config).unwrap();
        assert_relative_eq!(rec.score, -0.5);
        assert_eq!(rec.action, Action::Sell);
    }

    #[test]
    fn negative_weight_on_zero_sub_score_gives_positive_zero() {
        let config = ScoringConfig {
            weights: weights(&[("trend", -1.0), ("rsi", 1.0)]),
            ..ScoringConfig::default()
        };
        let snapshot = IndicatorSnapshot {
            trend: Trend::Sideways,
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &config).unwrap();
        assert_eq!(rec.score, 0.0);
        assert!(rec.score.is_sign_positive());
        assert_eq!(rec.action, Action::Hold);
    }

    #[test]
    fn reasoning_sorted_by_absolute_contribution() {
        let config = ScoringConfig {
            weights: weights(&[("rsi", 1.0), ("macd", 3.0), ("trend", 2.0)]),
            ..ScoringConfig::default()
        };
        let snapshot = IndicatorSnapshot {
            rsi: Some(25.0),
            macd_histogram: Some(-0.2),
            prev_macd_histogram: Some(0.1),
            trend: Trend::Uptrend,
            ..empty_snapshot()
        };
        let rec = score(&snapshot, &config).unwrap();
        // contributions: trend 2/6, macd 3 * -0.6 / 6, rsi 1/6
        assert_eq!(rec.reasoning.len(), 3);
        assert!(rec.reasoning[0].starts_with("trend Uptrend"));
        assert!(rec.reasoning[1].starts_with("MACD histogram -0.200"));
        assert!(rec.reasoning[2].starts_with("RSI 25.0 oversold"));
        assert!(rec.reasoning[1].ends_with("[macd -0.300]"));
    }

    #[test]
    fn unknown_weight_name_rejected() {
        let err = ScoringWeights::from_named([("volume", 1.0)]).unwrap_err();
        assert!(
            matches!(err, RecommenderError::InvalidConfiguration { section, key, .. } if section == "weights" && key == "volume")
        );
    }

    #[test]
    fn duplicate_weight_rejected() {
        assert!(ScoringWeights::from_named([("ma", 1.0), ("moving_average", 2.0)]).is_err());
    }

    #[test]
    fn inconsistent_thresholds_rejected() {
        let config = ScoringConfig {
            buy_threshold: -0.2,
            sell_threshold: 0.2,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            score(&full_snapshot(), &config),
            Err(RecommenderError::InvalidConfiguration { key, .. }) if key == "buy_threshold"
        ));

        let config = ScoringConfig {
            buy_threshold: 0.1,
            sell_threshold: 0.1,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_zero_weights_rejected() {
        let config = ScoringConfig {
            weights: weights(&[("rsi", 0.0)]),
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn action_and_category_display() {
        assert_eq!(Action::Buy.to_string(), "BUY");
        assert_eq!(Action::Hold.to_string(), "HOLD");
        assert_eq!(Category::MovingAverage.to_string(), "moving_average");
        assert_eq!(Category::from_name(" RSI "), Some(Category::Rsi));
    }
}
