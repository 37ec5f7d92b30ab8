//! Report generation port trait.

use crate::domain::error::RecommenderError;
use crate::domain::ranking::RankedList;
use crate::domain::universe::SkippedCode;

/// Port for writing recommendation reports.
pub trait ReportPort {
    fn write(
        &self,
        ranked: &RankedList,
        skipped: &[SkippedCode],
        output_path: &str,
    ) -> Result<(), RecommenderError>;
}
