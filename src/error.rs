// src/error.rs

use crate::month::Month;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A raw CSV is structurally unusable: required columns are missing, a value
/// failed to parse, or a result row references an unknown race/constructor.
#[derive(Debug, Error)]
#[error("bad data in {}: {reason}", .path.display())]
pub struct DataFormatError {
    pub path: PathBuf,
    pub reason: String,
}

impl DataFormatError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The requested month has no aggregate rows. Carries the available range so
/// the message can point the user at months that do exist.
#[derive(Debug)]
pub struct NoDataError {
    pub month: Month,
    pub available: Option<(Month, Month)>,
}

impl fmt::Display for NoDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no data for month {}", self.month)?;
        match self.available {
            Some((first, last)) => write!(f, "; data covers {first} to {last}"),
            None => write!(f, "; the monthly table is empty"),
        }
    }
}

impl std::error::Error for NoDataError {}
