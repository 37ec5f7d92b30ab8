//! Universe handling: code-list parsing, fetching and per-instrument analysis.
//!
//! Instruments are analyzed independently on the rayon pool. Each worker owns
//! its series and snapshot; results are merged and ranked only after every
//! instrument has finished. Per-instrument failures are recorded in
//! `skipped` and never abort the run.

use crate::domain::error::RecommenderError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::ranking::{rank, RankedList};
use crate::domain::scoring::{score, Recommendation, ScoringConfig};
use crate::domain::series::{normalize, RawSeries};
use crate::domain::snapshot::IndicatorSnapshot;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Everything the engine needs, validated once before any computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), RecommenderError> {
        self.indicators.validate()?;
        self.scoring.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    InvalidSeries(String),
    Analysis(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::InvalidSeries(reason) => write!(f, "invalid series: {}", reason),
            SkipReason::Analysis(reason) => write!(f, "analysis failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct UniverseAnalysis {
    pub ranked: RankedList,
    pub skipped: Vec<SkippedCode>,
}

/// SeriesStore → IndicatorEngine → ScoringEngine for one instrument.
pub fn analyze_instrument(
    raw: RawSeries,
    config: &AnalysisConfig,
) -> Result<Recommendation, RecommenderError> {
    let series = normalize(raw)?;
    let snapshot = IndicatorSnapshot::compute(&series, &config.indicators)?;
    debug!(
        code = %snapshot.code,
        bars = series.len(),
        trend = %snapshot.trend,
        "computed indicator snapshot"
    );
    score(&snapshot, &config.scoring)
}

fn skip_reason(err: &RecommenderError) -> SkipReason {
    match err {
        RecommenderError::InvalidSeries { reason, .. } => SkipReason::InvalidSeries(reason.clone()),
        RecommenderError::Data { reason } => SkipReason::FetchFailed(reason.clone()),
        other => SkipReason::Analysis(other.to_string()),
    }
}

pub fn analyze_universe(
    inputs: Vec<RawSeries>,
    config: &AnalysisConfig,
) -> Result<UniverseAnalysis, RecommenderError> {
    config.validate()?;

    let total = inputs.len();
    let results: Vec<(String, Result<Recommendation, RecommenderError>)> = inputs
        .into_par_iter()
        .map(|raw| {
            let code = raw.code.clone();
            (code, analyze_instrument(raw, config))
        })
        .collect();

    let mut recommendations = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();

    for (code, result) in results {
        match result {
            Ok(rec) => recommendations.push(rec),
            Err(e) if e.is_per_instrument() => {
                warn!(code = %code, reason = %e, "excluding instrument from ranking");
                skipped.push(SkippedCode {
                    reason: skip_reason(&e),
                    code,
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        ranked = recommendations.len(),
        skipped = skipped.len(),
        total,
        "universe analysis complete"
    );

    Ok(UniverseAnalysis {
        ranked: rank(recommendations),
        skipped,
    })
}

/// Fetches every code sequentially. Fetch failures are returned as skipped
/// codes, never as an error.
pub fn fetch_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> (Vec<RawSeries>, Vec<SkippedCode>) {
    let mut fetched = Vec::with_capacity(codes.len());
    let mut skipped = Vec::new();

    for code in codes {
        match data_port.fetch_bars(code, start_date, end_date) {
            Ok(bars) => {
                debug!(code = %code, bars = bars.len(), "fetched price series");
                fetched.push(RawSeries::new(code.clone(), bars));
            }
            Err(e) => {
                warn!(code = %code, reason = %e, "fetch failed, skipping");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
            }
        }
    }

    (fetched, skipped)
}

/// Fetch, analyze and rank a universe. Configuration is validated before the
/// first fetch.
pub fn run_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: &AnalysisConfig,
) -> Result<UniverseAnalysis, RecommenderError> {
    config.validate()?;

    info!(codes = codes.len(), %start_date, %end_date, "fetching universe");
    let (fetched, mut fetch_skipped) = fetch_universe(data_port, codes, start_date, end_date);

    let mut analysis = analyze_universe(fetched, config)?;
    fetch_skipped.append(&mut analysis.skipped);
    fetch_skipped.sort_by(|a, b| a.code.cmp(&b.code));
    analysis.skipped = fetch_skipped;
    Ok(analysis)
}
