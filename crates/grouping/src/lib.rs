//! # Register Grouping
//!
//! Users bucket related registers into named groups so the pareto shows one
//! line per failure mechanism rather than one per register.
//!
//! - `RuleFile` / `RuleBook`: the parsed group-definition files of a run.
//! - `GroupClassifier`: partitions one table's registers, first match wins.
//! - `GroupingError`: returned when a definition file is malformed.

pub mod classifier;
pub mod error;
pub mod rules;

pub use classifier::{Classification, GroupClassifier, GroupOutcome};
pub use error::GroupingError;
pub use rules::{GroupRule, Pattern, RuleBook, RuleFile};

