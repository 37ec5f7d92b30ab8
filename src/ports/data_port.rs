//! Data access port trait (the fetch-layer boundary).

use crate::domain::bar::Bar;
use crate::domain::error::RecommenderError;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `code` between `start_date` and `end_date` inclusive.
    /// Ordering and validity are not guaranteed; callers normalize.
    fn fetch_bars(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, RecommenderError>;

    fn list_symbols(&self) -> Result<Vec<String>, RecommenderError>;
}
