//! Per-file loaders for the three raw CSVs. Each loader checks the header for
//! the columns it needs before touching any row, so a renamed or truncated
//! export fails with a message naming the file and the columns.

use crate::error::DataFormatError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, StringRecord};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::NA;

#[derive(Debug, Deserialize)]
struct RaceRow {
    #[serde(rename = "raceId")]
    race_id: u32,
    date: String,
}

#[derive(Debug, Deserialize)]
struct ConstructorRow {
    #[serde(rename = "constructorId")]
    constructor_id: u32,
    name: String,
}

/// One row of `constructor_results.csv`, points still optional.
#[derive(Debug, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "raceId")]
    pub race_id: u32,
    #[serde(rename = "constructorId")]
    pub constructor_id: u32,
    #[serde(deserialize_with = "de_opt_points")]
    pub points: Option<f64>,
}

fn de_opt_points<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = String::deserialize(d)?;
    let raw = raw.trim();
    if raw.is_empty() || raw == NA {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(serde::de::Error::custom)?;
    // `"NaN"` and `"inf"` parse as valid f64s but would poison sums and
    // defeat the descending sort later on.
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "non-finite points value `{raw}`"
        )));
    }
    Ok(Some(value))
}

fn open_csv(path: &Path) -> Result<Reader<File>> {
    ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))
}

fn check_columns(path: &Path, headers: &StringRecord, required: &[&str]) -> Result<(), DataFormatError> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataFormatError::new(
            path,
            format!("missing columns: {}", missing.join(", ")),
        ))
    }
}

/// Loads `races.csv` as race_id → race date.
pub fn load_races(path: &Path) -> Result<HashMap<u32, NaiveDate>> {
    let mut rdr = open_csv(path)?;
    check_columns(path, rdr.headers()?, &["raceId", "date"])?;

    let mut races = HashMap::new();
    for (idx, row) in rdr.deserialize::<RaceRow>().enumerate() {
        // CSV row numbers are 1-based and the header is row 1.
        let line = idx + 2;
        let row = row.map_err(|e| DataFormatError::new(path, format!("row {line}: {e}")))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            DataFormatError::new(path, format!("row {line}: bad race date `{}`: {e}", row.date))
        })?;
        races.insert(row.race_id, date);
    }
    debug!(count = races.len(), "loaded races");
    Ok(races)
}

/// Loads `constructors.csv` as constructor_id → readable name.
pub fn load_constructors(path: &Path) -> Result<HashMap<u32, String>> {
    let mut rdr = open_csv(path)?;
    check_columns(path, rdr.headers()?, &["constructorId", "name"])?;

    let mut constructors = HashMap::new();
    for (idx, row) in rdr.deserialize::<ConstructorRow>().enumerate() {
        let row = row
            .map_err(|e| DataFormatError::new(path, format!("row {}: {e}", idx + 2)))?;
        constructors.insert(row.constructor_id, row.name);
    }
    debug!(count = constructors.len(), "loaded constructors");
    Ok(constructors)
}

/// Loads one `constructor_results*.csv` file.
pub fn load_constructor_results(path: &Path) -> Result<Vec<ResultRow>> {
    let mut rdr = open_csv(path)?;
    check_columns(path, rdr.headers()?, &["raceId", "constructorId", "points"])?;

    let mut rows = Vec::new();
    for (idx, row) in rdr.deserialize::<ResultRow>().enumerate() {
        let row = row
            .map_err(|e| DataFormatError::new(path, format!("row {}: {e}", idx + 2)))?;
        rows.push(row);
    }
    debug!(count = rows.len(), file = %path.display(), "loaded constructor results");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_races_ignoring_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "races.csv",
            "raceId,year,round,circuitId,name,date,time\n\
             860,2012,1,1,Australian Grand Prix,2012-03-18,06:00:00\n\
             870,2012,11,9,Hungarian Grand Prix,2012-07-29,12:00:00\n",
        );
        let races = load_races(&path).unwrap();
        assert_eq!(races.len(), 2);
        assert_eq!(
            races[&870],
            NaiveDate::from_ymd_opt(2012, 7, 29).unwrap()
        );
    }

    #[test]
    fn missing_column_is_a_data_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "races.csv", "raceId,year\n860,2012\n");
        let err = load_races(&path).unwrap_err();
        let fmt_err = err
            .downcast_ref::<DataFormatError>()
            .expect("expected DataFormatError");
        assert!(fmt_err.reason.contains("date"), "reason: {}", fmt_err.reason);
    }

    #[test]
    fn bad_race_date_is_a_data_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "races.csv", "raceId,date\n860,18/03/2012\n");
        let err = load_races(&path).unwrap_err();
        assert!(err.downcast_ref::<DataFormatError>().is_some());
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let dir = TempDir::new().unwrap();
        for bad in ["NaN", "inf", "-inf"] {
            let path = write_csv(
                &dir,
                "constructor_results.csv",
                &format!("raceId,constructorId,points\n860,6,{bad}\n"),
            );
            let err = load_constructor_results(&path).unwrap_err();
            let fmt_err = err
                .downcast_ref::<DataFormatError>()
                .expect("expected DataFormatError");
            assert!(
                fmt_err.reason.contains("row 2"),
                "reason for {bad}: {}",
                fmt_err.reason
            );
        }
    }

    #[test]
    fn na_and_empty_points_load_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "constructor_results.csv",
            "constructorResultsId,raceId,constructorId,points,status\n\
             1,860,6,25,\\N\n\
             2,860,131,\\N,D\n\
             3,870,6,,\\N\n",
        );
        let rows = load_constructor_results(&path).unwrap();
        assert_eq!(rows[0].points, Some(25.0));
        assert_eq!(rows[1].points, None);
        assert_eq!(rows[2].points, None);
    }
}
