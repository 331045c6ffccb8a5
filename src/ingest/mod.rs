// src/ingest/mod.rs

mod tables;

pub use tables::{load_constructor_results, load_constructors, load_races, ResultRow};

use crate::error::DataFormatError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::info;

/// The raw dataset marks missing values with a literal `\N`.
pub(crate) const NA: &str = "\\N";

/// One constructor's outcome in one race, joined across the three raw files.
/// (race_id, constructor_id) is unique in the source data.
#[derive(Debug, Clone)]
pub struct RaceResult {
    pub race_id: u32,
    pub race_date: NaiveDate,
    pub constructor_id: u32,
    pub constructor_name: String,
    pub points: Option<f64>,
}

/// Loads every raw file under `raw_dir` and joins result rows to their race
/// date and constructor name. Result files may be split across several
/// `constructor_results*.csv` exports; they are loaded in filename order.
#[tracing::instrument(level = "info", skip(raw_dir), fields(dir = %raw_dir.as_ref().display()))]
pub fn load_race_results<P: AsRef<Path>>(raw_dir: P) -> Result<Vec<RaceResult>> {
    let raw_dir = raw_dir.as_ref();
    let races = load_races(&raw_dir.join("races.csv"))?;
    let constructors = load_constructors(&raw_dir.join("constructors.csv"))?;

    let pattern = format!("{}/constructor_results*.csv", raw_dir.display());
    let mut result_files: Vec<PathBuf> = glob(&pattern)
        .context("invalid glob pattern for raw result files")?
        .filter_map(std::result::Result::ok)
        .collect();
    result_files.sort();
    if result_files.is_empty() {
        return Err(DataFormatError::new(
            raw_dir,
            "no constructor_results*.csv files found",
        )
        .into());
    }

    let mut out = Vec::new();
    for file in &result_files {
        for row in load_constructor_results(file)? {
            let race_date = *races.get(&row.race_id).ok_or_else(|| {
                DataFormatError::new(
                    file,
                    format!("result references unknown raceId {}", row.race_id),
                )
            })?;
            let constructor_name = constructors
                .get(&row.constructor_id)
                .cloned()
                .ok_or_else(|| {
                    DataFormatError::new(
                        file,
                        format!(
                            "result references unknown constructorId {}",
                            row.constructor_id
                        ),
                    )
                })?;
            out.push(RaceResult {
                race_id: row.race_id,
                race_date,
                constructor_id: row.constructor_id,
                constructor_name,
                points: row.points,
            });
        }
    }

    info!(
        rows = out.len(),
        files = result_files.len(),
        "joined race results"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_raw_dir(dir: &TempDir) {
        fs::write(
            dir.path().join("races.csv"),
            "raceId,date\n860,2012-07-08\n861,2012-07-22\n862,2012-08-05\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("constructors.csv"),
            "constructorId,name\n6,Ferrari\n131,Mercedes\n",
        )
        .unwrap();
    }

    #[test]
    fn joins_results_to_dates_and_names() {
        let dir = TempDir::new().unwrap();
        seed_raw_dir(&dir);
        fs::write(
            dir.path().join("constructor_results.csv"),
            "raceId,constructorId,points\n860,6,20\n862,6,35\n862,131,18\n",
        )
        .unwrap();

        let rows = load_race_results(dir.path()).unwrap();
        assert_eq!(rows.len(), 3);
        let ferrari_aug = rows
            .iter()
            .find(|r| r.constructor_id == 6 && r.race_id == 862)
            .unwrap();
        assert_eq!(ferrari_aug.constructor_name, "Ferrari");
        assert_eq!(
            ferrari_aug.race_date,
            NaiveDate::from_ymd_opt(2012, 8, 5).unwrap()
        );
        assert_eq!(ferrari_aug.points, Some(35.0));
    }

    #[test]
    fn merges_split_result_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        seed_raw_dir(&dir);
        fs::write(
            dir.path().join("constructor_results_part1.csv"),
            "raceId,constructorId,points\n860,6,20\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("constructor_results_part2.csv"),
            "raceId,constructorId,points\n861,131,12\n",
        )
        .unwrap();

        let rows = load_race_results(dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].constructor_name, "Ferrari");
        assert_eq!(rows[1].constructor_name, "Mercedes");
    }

    #[test]
    fn unknown_race_reference_fails() {
        let dir = TempDir::new().unwrap();
        seed_raw_dir(&dir);
        fs::write(
            dir.path().join("constructor_results.csv"),
            "raceId,constructorId,points\n999,6,20\n",
        )
        .unwrap();

        let err = load_race_results(dir.path()).unwrap_err();
        let fmt_err = err
            .downcast_ref::<DataFormatError>()
            .expect("expected DataFormatError");
        assert!(fmt_err.reason.contains("999"), "reason: {}", fmt_err.reason);
    }

    #[test]
    fn missing_result_files_fail() {
        let dir = TempDir::new().unwrap();
        seed_raw_dir(&dir);
        let err = load_race_results(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<DataFormatError>().is_some());
    }
}
