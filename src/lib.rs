pub mod aggregate;
pub mod clean;
pub mod error;
pub mod export;
pub mod ingest;
pub mod month;
pub mod report;
