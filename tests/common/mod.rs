#![allow(dead_code)]

use chrono::NaiveDate;
pub use twstock::domain::bar::Bar;
use twstock::domain::error::RecommenderError;
use twstock::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, RecommenderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(RecommenderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .copied()
                .collect()),
            None => Err(RecommenderError::Data {
                reason: format!("no data for {}", code),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, RecommenderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> Bar {
    Bar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day starting at `start`, one per close.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// Linear series: `start_price + step * i`.
pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64, step: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + step * i as f64).collect();
    bars_from_closes(start, &closes)
}
