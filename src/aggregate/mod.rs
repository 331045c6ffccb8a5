// src/aggregate/mod.rs

use crate::clean::CleanRecord;
use crate::month::Month;
use std::collections::BTreeMap;
use tracing::info;

/// Total points for one constructor in one month. Unique per
/// (constructor_id, month).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoints {
    pub constructor_id: u32,
    pub constructor_name: String,
    pub month: Month,
    pub points: f64,
}

/// A monthly total annotated with its month-over-month movement.
///
/// `prev_points` is the total for the constructor's previous month *with
/// data* (LAG semantics, not the previous calendar month). All three fields
/// are `None` for a constructor's first observed month; `growth` is also
/// `None` when the previous total was 0, so a comeback from a pointless month
/// never shows up as fake infinite growth.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub constructor_id: u32,
    pub constructor_name: String,
    pub month: Month,
    pub points: f64,
    pub prev_points: Option<f64>,
    pub delta: Option<f64>,
    pub growth: Option<f64>,
}

/// Groups cleaned rows by (constructor, month) and sums points, skipping
/// missing values. Output is sorted by (constructor_id, month).
pub fn monthly_totals(records: &[CleanRecord]) -> Vec<MonthlyPoints> {
    let mut totals: BTreeMap<(u32, Month), (String, f64)> = BTreeMap::new();
    for r in records {
        let entry = totals
            .entry((r.constructor_id, r.month))
            .or_insert_with(|| (r.constructor_name.clone(), 0.0));
        if let Some(p) = r.points {
            entry.1 += p;
        }
    }

    let out: Vec<MonthlyPoints> = totals
        .into_iter()
        .map(|((constructor_id, month), (constructor_name, points))| MonthlyPoints {
            constructor_id,
            constructor_name,
            month,
            points,
        })
        .collect();
    info!(keys = out.len(), "aggregated monthly totals");
    out
}

/// Annotates each monthly total with delta and growth versus the
/// constructor's previous month. `totals` must be sorted by
/// (constructor_id, month), which `monthly_totals` guarantees.
pub fn with_trend(totals: &[MonthlyPoints]) -> Vec<TrendRow> {
    let mut out = Vec::with_capacity(totals.len());
    let mut prev: Option<(u32, f64)> = None;

    for t in totals {
        let prev_points = match prev {
            Some((cid, p)) if cid == t.constructor_id => Some(p),
            _ => None,
        };
        let delta = prev_points.map(|p| t.points - p);
        let growth = match prev_points {
            Some(p) if p != 0.0 => Some((t.points - p) / p),
            _ => None,
        };
        out.push(TrendRow {
            constructor_id: t.constructor_id,
            constructor_name: t.constructor_name.clone(),
            month: t.month,
            points: t.points,
            prev_points,
            delta,
            growth,
        });
        prev = Some((t.constructor_id, t.points));
    }
    out
}

/// The full gold table: monthly totals plus month-over-month trend.
pub fn monthly_table(records: &[CleanRecord]) -> Vec<TrendRow> {
    with_trend(&monthly_totals(records))
}
