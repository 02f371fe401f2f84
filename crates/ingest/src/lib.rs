//! # Table Ingest
//!
//! Reads the per-step tables produced by the upstream extractor: one
//! transposed CSV per (step, configuration, package), registers down the side
//! and work weeks across the top. Register names are normalized on the way in
//! and the `YIELD` row is split off as the table's yield row.

pub mod error;
pub mod reader;

pub use error::IngestError;
pub use reader::{load_all, load_step_table, read_step_table, table_path, IngestOptions};
