//! Collector for the hospital-bed tables of the Brazilian health-facility
//! registry (CNES/DATASUS).
//!
//! A run loads an env-style config, fetches each state's bed-type index and
//! every table it links to, extracts one [`BedRecord`] per facility row, and
//! writes them all to a single CSV, TSV, JSON or Parquet file.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod record;
pub mod uf;
pub mod write;

pub use config::{ExtractionConfig, InvalidCountPolicy, OutputFormat, RetryPolicy};
pub use error::{ExtractError, Stage};
pub use fetch::{Fetcher, RawDocument};
pub use pipeline::{run, run_from_file, RunSummary};
pub use record::{BedRecord, Period};
pub use uf::Uf;
