//! # Pareto Engine
//!
//! Wires the pure stages into a weekly run: every `StepTable` becomes a ranked
//! `StepPareto` (registers, groups, breakout, annotations and accounted
//! yields), and every (configuration, package) gets a composite ranking.
//!
//! ## Architectural Principles
//!
//! - **No I/O:** tables and definition text come in, `ParetoRun` goes out.
//!   Reading files and writing reports belong to `ingest` and `report`.
//! - **Explicit context:** group rules and annotation sets are loaded once
//!   into a `ParetoContext` and borrowed by the engine.
//!
//! ## Public API
//!
//! - `ParetoContext` / `SourceText`: loaded user definitions.
//! - `ParetoEngine`: builds step paretos and composites.
//! - `ParetoRun` / `StepPareto`: the results.
//! - `ParetoError`: the specific error types of this crate.

pub mod context;
pub mod engine;
pub mod error;
pub mod step;

pub use context::{ParetoContext, SourceText};
pub use engine::{CompositeFailure, ParetoEngine, ParetoRun};
pub use error::ParetoError;
pub use step::{BreakoutRow, RankedGroup, RankedRegister, StepPareto};
