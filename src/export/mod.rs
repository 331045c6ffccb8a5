// src/export/mod.rs

use crate::aggregate::TrendRow;
use crate::clean::CleanSummary;
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Writes the monthly table to a Parquet file. Column layout mirrors the
/// chart inputs: one row per (constructor, month), with the month stored as
/// its first day.
pub fn write_parquet(rows: &[TrendRow], out_path: &Path) -> Result<()> {
    let schema = Schema::new(vec![
        Field::new("constructor_id", DataType::Int64, false),
        Field::new("constructor_name", DataType::Utf8, false),
        Field::new("m", DataType::Date32, false),
        Field::new("points_m", DataType::Float64, false),
        Field::new("prev_points_m", DataType::Float64, true),
        Field::new("mom_delta", DataType::Float64, true),
        Field::new("mom_growth", DataType::Float64, true),
    ]);

    // Date32 counts days since the Unix epoch.
    let epoch = NaiveDate::default();
    let days: Vec<i32> = rows
        .iter()
        .map(|r| r.month.first_day().signed_duration_since(epoch).num_days() as i32)
        .collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(
            rows.iter().map(|r| i64::from(r.constructor_id)),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.constructor_name.as_str()),
        )),
        Arc::new(Date32Array::from(days)),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.points))),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.prev_points).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.delta).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.growth).collect::<Vec<_>>(),
        )),
    ];

    let batch = RecordBatch::try_new(Arc::new(schema.clone()), columns)
        .context("building monthly table record batch")?;

    let file = File::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema), Some(props))
        .context("creating Arrow writer for monthly table")?;
    writer.write(&batch).context("writing monthly table batch")?;
    writer.close().context("closing monthly table writer")?;

    info!(rows = rows.len(), path = %out_path.display(), "wrote parquet export");
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    constructor_id: u32,
    constructor_name: &'a str,
    month: String,
    points: f64,
    prev_points: Option<f64>,
    delta: Option<f64>,
    growth: Option<f64>,
}

/// Writes the monthly table as CSV; missing deltas stay empty, never 0.
pub fn write_csv(rows: &[TrendRow], out_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    for r in rows {
        wtr.serialize(CsvRow {
            constructor_id: r.constructor_id,
            constructor_name: &r.constructor_name,
            month: r.month.to_string(),
            points: r.points,
            prev_points: r.prev_points,
            delta: r.delta,
            growth: r.growth,
        })
        .context("writing monthly table csv row")?;
    }
    wtr.flush().context("flushing monthly table csv")?;
    info!(rows = rows.len(), path = %out_path.display(), "wrote csv export");
    Ok(())
}

#[derive(Serialize)]
struct ExportSummary<'a> {
    rows: usize,
    constructors: usize,
    months: usize,
    first_month: Option<String>,
    last_month: Option<String>,
    clean: &'a CleanSummary,
}

/// Writes a small JSON run summary next to the exports.
pub fn write_summary(rows: &[TrendRow], clean: &CleanSummary, out_path: &Path) -> Result<()> {
    let constructors: BTreeSet<u32> = rows.iter().map(|r| r.constructor_id).collect();
    let months: BTreeSet<_> = rows.iter().map(|r| r.month).collect();
    let summary = ExportSummary {
        rows: rows.len(),
        constructors: constructors.len(),
        months: months.len(),
        first_month: months.iter().next().map(ToString::to_string),
        last_month: months.iter().next_back().map(ToString::to_string),
        clean,
    };

    let file = File::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    serde_json::to_writer_pretty(file, &summary).context("writing run summary json")?;
    info!(path = %out_path.display(), "wrote run summary");
    Ok(())
}
