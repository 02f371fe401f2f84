//! # Reports
//!
//! Presentation of a `ParetoRun`: comfy-table tables for the terminal, one CSV
//! per table, and a JSON dump of the whole run. Week columns are headed
//! `WWxx`; unmeasured fallout is left blank; an accounted yield that could not
//! be computed shows as `NULL`, one with no data as `-`.

pub mod error;
pub mod export;
pub mod format;
pub mod terminal;

pub use error::ReportError;
pub use export::{export_run, write_composite_csv, write_json, write_step_csv, RUN_JSON};
pub use terminal::{render_composite, render_failure, render_run, render_step};
