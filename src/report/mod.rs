// src/report/mod.rs

pub mod chart;
mod index;

pub use chart::render_month_chart;
pub use index::render_all;

use crate::aggregate::TrendRow;
use crate::error::NoDataError;
use crate::month::Month;
use std::cmp::Ordering;

/// Filters the monthly table to `month` and returns at most `k` rows, sorted
/// descending by points (ties broken by name so output is deterministic).
/// A month with no rows is a `NoDataError` carrying the available range.
pub fn top_for_month(
    table: &[TrendRow],
    month: Month,
    k: usize,
) -> Result<Vec<&TrendRow>, NoDataError> {
    let mut rows: Vec<&TrendRow> = table.iter().filter(|r| r.month == month).collect();
    if rows.is_empty() {
        let first = table.iter().map(|r| r.month).min();
        let last = table.iter().map(|r| r.month).max();
        return Err(NoDataError {
            month,
            available: first.zip(last),
        });
    }

    rows.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.constructor_name.cmp(&b.constructor_name))
    });
    rows.truncate(k);
    Ok(rows)
}
