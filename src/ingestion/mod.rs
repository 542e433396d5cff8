//! Ingestion pipeline: raw cells → [`crate::types::Value`]s → [`crate::types::Record`]s →
//! [`crate::types::Workbook`].
//!
//! Most callers should use [`parse_workbook`] (from [`workbook`]) which:
//!
//! - auto-detects the spreadsheet container from the bytes
//! - normalizes every sheet into uniform records
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! The building blocks are also available on their own:
//! - [`coerce`]: cell coercion
//! - [`normalize`]: header inference and row normalization

pub mod coerce;
pub mod normalize;
pub mod observability;
pub mod workbook;

pub use coerce::coerce;
pub use normalize::normalize_rows;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LogObserver, StdErrObserver,
};
pub use workbook::{parse_with_source, parse_workbook, parse_workbook_from_path, ParseOptions};
