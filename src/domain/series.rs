//! Price series normalization.
//!
//! A [`RawSeries`] is whatever the data layer handed back; [`normalize`] turns
//! it into a [`PriceSeries`]: sorted ascending by date, no duplicate dates,
//! every bar satisfying the OHLC invariants, at least one bar. Missing trading
//! days are left as gaps.

use crate::domain::bar::Bar;
use crate::domain::error::RecommenderError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct RawSeries {
    pub code: String,
    pub bars: Vec<Bar>,
}

impl RawSeries {
    pub fn new(code: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            code: code.into(),
            bars,
        }
    }
}

/// Validated, date-ordered daily bars for one instrument.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    code: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }
}

pub fn normalize(raw: RawSeries) -> Result<PriceSeries, RecommenderError> {
    let RawSeries { code, mut bars } = raw;

    if bars.is_empty() {
        return Err(RecommenderError::invalid_series(&code, "series has no bars"));
    }

    for bar in &bars {
        bar.check()
            .map_err(|reason| RecommenderError::invalid_series(&code, reason))?;
    }

    if !bars.windows(2).all(|w| w[0].date <= w[1].date) {
        bars.sort_by_key(|b| b.date);
    }

    if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(RecommenderError::invalid_series(
            &code,
            format!("duplicate date {}", w[0].date),
        ));
    }

    Ok(PriceSeries { code, bars })
}
