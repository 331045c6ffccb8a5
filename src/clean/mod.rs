// src/clean/mod.rs

use crate::ingest::{RaceResult, NA};
use crate::month::Month;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A validated race result carrying its derived month label.
#[derive(Debug, Clone)]
pub struct CleanRecord {
    pub race_id: u32,
    pub race_date: NaiveDate,
    pub month: Month,
    pub constructor_id: u32,
    pub constructor_name: String,
    pub points: Option<f64>,
}

/// Data-quality counters accumulated during cleaning.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_dropped: usize,
    pub negative_points_coerced: usize,
    pub missing_points: usize,
    pub missing_names: usize,
}

/// Dedupes on (race_id, constructor_id), coerces impossible values to missing
/// and derives the month label. A missing constructor name (`\N` or empty)
/// is counted and relabelled `constructor-<id>` so it never reaches a chart
/// as the raw sentinel. Never grows the row count.
pub fn clean(raw: Vec<RaceResult>) -> (Vec<CleanRecord>, CleanSummary) {
    let mut summary = CleanSummary {
        rows_in: raw.len(),
        ..CleanSummary::default()
    };

    let mut by_key: BTreeMap<(u32, u32), CleanRecord> = BTreeMap::new();
    for r in raw {
        let mut points = r.points;
        if let Some(p) = points {
            if p < 0.0 {
                // Negative points are impossible in the source data.
                warn!(
                    race_id = r.race_id,
                    constructor = %r.constructor_name,
                    points = p,
                    "negative points coerced to missing"
                );
                summary.negative_points_coerced += 1;
                points = None;
            }
        }

        let mut constructor_name = r.constructor_name;
        if constructor_name.trim().is_empty() || constructor_name == NA {
            warn!(
                race_id = r.race_id,
                constructor_id = r.constructor_id,
                "missing constructor name"
            );
            summary.missing_names += 1;
            constructor_name = format!("constructor-{}", r.constructor_id);
        }

        let record = CleanRecord {
            race_id: r.race_id,
            race_date: r.race_date,
            month: Month::of(r.race_date),
            constructor_id: r.constructor_id,
            constructor_name,
            points,
        };

        match by_key.entry((record.race_id, record.constructor_id)) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                // Keep the row with the higher points; a present value beats
                // a missing one.
                summary.duplicates_dropped += 1;
                let keep_new = match (record.points, slot.get().points) {
                    (Some(new), Some(old)) => new > old,
                    (Some(_), None) => true,
                    _ => false,
                };
                if keep_new {
                    slot.insert(record);
                }
            }
        }
    }

    let records: Vec<CleanRecord> = by_key.into_values().collect();
    summary.rows_out = records.len();
    summary.missing_points = records.iter().filter(|r| r.points.is_none()).count();

    info!(
        rows_in = summary.rows_in,
        rows_out = summary.rows_out,
        duplicates_dropped = summary.duplicates_dropped,
        negative_points_coerced = summary.negative_points_coerced,
        missing_points = summary.missing_points,
        missing_names = summary.missing_names,
        "cleaned race results"
    );
    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(race_id: u32, date: &str, constructor_id: u32, points: Option<f64>) -> RaceResult {
        RaceResult {
            race_id,
            race_date: date.parse().unwrap(),
            constructor_id,
            constructor_name: format!("team-{constructor_id}"),
            points,
        }
    }

    #[test]
    fn month_label_matches_source_date() {
        let rows = vec![
            raw(1, "2012-07-08", 6, Some(20.0)),
            raw(2, "2012-12-31", 6, Some(5.0)),
            raw(3, "1958-01-19", 3, Some(8.0)),
        ];
        let (records, _) = clean(rows);
        for r in &records {
            assert_eq!(r.month, Month::of(r.race_date));
            assert_eq!(
                r.month.to_string(),
                r.race_date.format("%Y-%m").to_string()
            );
        }
    }

    #[test]
    fn dedupe_keeps_the_highest_points_row() {
        let rows = vec![
            raw(1, "2012-07-08", 6, Some(10.0)),
            raw(1, "2012-07-08", 6, Some(25.0)),
            raw(1, "2012-07-08", 6, None),
        ];
        let (records, summary) = clean(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].points, Some(25.0));
        assert_eq!(summary.duplicates_dropped, 2);
        assert_eq!(summary.rows_in, 3);
        assert_eq!(summary.rows_out, 1);
    }

    #[test]
    fn present_points_beat_missing_regardless_of_order() {
        let rows = vec![
            raw(1, "2012-07-08", 6, None),
            raw(1, "2012-07-08", 6, Some(4.0)),
        ];
        let (records, _) = clean(rows);
        assert_eq!(records[0].points, Some(4.0));
    }

    #[test]
    fn missing_names_are_counted_and_relabelled() {
        let mut sentinel = raw(1, "2012-07-08", 6, Some(20.0));
        sentinel.constructor_name = "\\N".to_string();
        let mut blank = raw(2, "2012-07-22", 7, Some(8.0));
        blank.constructor_name = "  ".to_string();
        let ok = raw(3, "2012-08-05", 6, Some(35.0));

        let (records, summary) = clean(vec![sentinel, blank, ok]);
        assert_eq!(summary.missing_names, 2);
        assert_eq!(records[0].constructor_name, "constructor-6");
        assert_eq!(records[1].constructor_name, "constructor-7");
        assert_eq!(records[2].constructor_name, "team-6");
        assert!(records.iter().all(|r| r.constructor_name != "\\N"));
    }

    #[test]
    fn negative_points_become_missing() {
        let rows = vec![
            raw(1, "2012-07-08", 6, Some(-3.0)),
            raw(2, "2012-07-22", 6, Some(12.0)),
        ];
        let (records, summary) = clean(rows);
        assert_eq!(summary.negative_points_coerced, 1);
        assert_eq!(summary.missing_points, 1);
        assert_eq!(records[0].points, None);
        assert_eq!(records[1].points, Some(12.0));
    }
}
