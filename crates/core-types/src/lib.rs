//! # Core Types
//!
//! Layer 0 of the workspace: the vocabulary every other crate speaks. Test
//! steps, configurations and package types, the normalized fallout table of a
//! step, and the per-group sums derived from it.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{CompositeSource, Configuration, Package, Step, Week};
pub use error::CoreError;
pub use structs::{
    measured, FalloutRecord, GroupRecord, StepTable, TableKey, WeekLabels, YieldRow, YIELD_ROW_KEY,
};
