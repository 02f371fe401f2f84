//! # Composite Weighted Pareto
//!
//! Ranks fallout across all steps of one (configuration, package) on a single
//! scale. A unit lost at an early step would still have had to survive every
//! later step, so early-step fallout is discounted by the downstream yield
//! chain before ranking.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** depends only on `core-types`. Yields come in as
//!   `StepYields`, lines as `StepLines`; nothing is read from disk here.
//! - **All-or-nothing:** a composite is only built when every step carries a
//!   yield for both weeks. A gap fails this composite alone.
//!
//! ## Public API
//!
//! - `StepYields` / `StepWeights`: the per-step yields and derived weights.
//! - `CompositeWeightEngine`: weights, concatenates and ranks.
//! - `CompositeTable` / `CompositeRow`: the ranked result.
//! - `CompositeError`: returned when required yields are missing.

pub mod engine;
pub mod error;
pub mod yields;

pub use engine::{CompositeRow, CompositeTable, CompositeWeightEngine, FalloutLine, StepLines};
pub use error::CompositeError;
pub use yields::{StepWeights, StepYields, WeekWeights};
