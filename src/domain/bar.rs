//! Daily OHLCV bar.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Checks price positivity, the `low <= open,close <= high` ordering and
    /// a non-negative volume. Returns a description of the first violation.
    pub fn check(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} {}: {} must be a positive number", self.date, name, value));
            }
        }
        if self.low > self.open.min(self.close) || self.high < self.open.max(self.close) {
            return Err(format!(
                "{}: OHLC ordering violated (open {}, high {}, low {}, close {})",
                self.date, self.open, self.high, self.low, self.close
            ));
        }
        if self.volume < 0 {
            return Err(format!("{}: negative volume {}", self.date, self.volume));
        }
        Ok(())
    }
}
