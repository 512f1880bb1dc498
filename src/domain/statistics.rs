//! Paired operation-flow statistics.
//!
//! Works over two operation-conditioned amount columns treated as opposite
//! flows (contributions vs rescues, buys vs sells): sum and non-zero count
//! on each side, plus the signed difference.

use crate::domain::schema::ColumnHandle;
use crate::domain::table::Table;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowStatistics {
    pub positive_sum: f64,
    pub positive_count: usize,
    pub negative_sum: f64,
    pub negative_count: usize,
}

impl FlowStatistics {
    /// `positive` and `negative` are conditioned columns (Missing on
    /// non-matching rows). The negative side is reported as a positive
    /// magnitude; only non-zero cells count as occurrences.
    pub fn from_columns(table: &Table, positive: ColumnHandle, negative: ColumnHandle) -> Self {
        let (positive_sum, positive_count) = side(table, positive);
        let (negative_sum, negative_count) = side(table, negative);
        FlowStatistics {
            positive_sum,
            positive_count,
            negative_sum,
            negative_count,
        }
    }

    pub fn delta_sum(&self) -> f64 {
        self.positive_sum - self.negative_sum
    }

    pub fn delta_count(&self) -> i64 {
        self.positive_count as i64 - self.negative_count as i64
    }
}

fn side(table: &Table, handle: ColumnHandle) -> (f64, usize) {
    let mut sum = 0.0;
    let mut count = 0;
    for value in table.column(handle) {
        if let Some(n) = value.as_num() {
            sum += n;
            if n != 0.0 {
                count += 1;
            }
        }
    }
    (sum, count)
}
