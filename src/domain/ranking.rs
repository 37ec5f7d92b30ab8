//! Cross-instrument ranking of recommendations.
//!
//! Order: score descending, then confidence descending, then code ascending.

use crate::domain::scoring::Recommendation;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// 1-based position in the list.
    pub rank: usize,
    pub code: String,
    pub score: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedList {
    entries: Vec<RankedEntry>,
}

impl RankedList {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.code.as_str()).collect()
    }
}

/// `total_cmp` orders -0.0 below 0.0; both must tie.
fn unsigned_zero(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    unsigned_zero(b.score)
        .total_cmp(&unsigned_zero(a.score))
        .then_with(|| unsigned_zero(b.confidence).total_cmp(&unsigned_zero(a.confidence)))
        .then_with(|| a.code.cmp(&b.code))
}

pub fn rank(mut recommendations: Vec<Recommendation>) -> RankedList {
    recommendations.sort_by(compare);

    let entries = recommendations
        .into_iter()
        .enumerate()
        .map(|(i, recommendation)| RankedEntry {
            rank: i + 1,
            code: recommendation.code.clone(),
            score: recommendation.score,
            recommendation,
        })
        .collect();

    RankedList { entries }
}
