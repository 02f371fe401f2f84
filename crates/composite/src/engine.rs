use crate::error::CompositeError;
use crate::yields::{StepWeights, StepYields};
use core_types::{Configuration, FalloutRecord, GroupRecord, Package, Step};
use serde::Serialize;
use std::cmp::Ordering;

/// One unweighted line fed into the composite: a group or a register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FalloutLine {
    pub name: String,
    pub this_week: f64,
    pub last_week: f64,
    pub annotations: Vec<String>,
}

impl FalloutLine {
    pub fn new(name: impl Into<String>, this_week: f64, last_week: f64) -> Self {
        Self {
            name: name.into(),
            this_week,
            last_week,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }
}

impl From<&GroupRecord> for FalloutLine {
    fn from(group: &GroupRecord) -> Self {
        Self::new(group.group.clone(), group.this_week, group.last_week)
    }
}

impl From<&FalloutRecord> for FalloutLine {
    /// Unmeasured fallout weighs in as zero.
    fn from(record: &FalloutRecord) -> Self {
        Self::new(
            record.register.clone(),
            record.this_week.unwrap_or(0.0),
            record.last_week.unwrap_or(0.0),
        )
    }
}

/// The lines of one step, in the order the step produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLines {
    pub step: Step,
    pub lines: Vec<FalloutLine>,
}

impl StepLines {
    pub fn new(step: Step, lines: Vec<FalloutLine>) -> Self {
        Self { step, lines }
    }
}

/// A row of the cross-step ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeRow {
    pub step: Step,
    pub name: String,
    pub weighted_this_week: f64,
    pub weighted_last_week: f64,
    pub annotations: Vec<String>,
}

/// The ranked composite of one (configuration, package).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeTable {
    pub configuration: Configuration,
    pub package: Package,
    pub weights: StepWeights,
    pub rows: Vec<CompositeRow>,
}

/// A stateless calculator that weights each step's fallout by the yield of the
/// steps after it, so every line is expressed in end-of-line terms.
#[derive(Debug, Default)]
pub struct CompositeWeightEngine {}

impl CompositeWeightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weights and ranks the lines of every step.
    ///
    /// Lines are concatenated in step order (then in their given order) and
    /// stable-sorted by weighted this-week fallout, highest first. Ties keep
    /// their concatenation order.
    pub fn combine(
        &self,
        yields: &StepYields,
        mut steps: Vec<StepLines>,
    ) -> Result<CompositeTable, CompositeError> {
        let weights = yields.weights()?;

        steps.sort_by_key(|s| s.step);

        let mut rows: Vec<CompositeRow> = steps
            .into_iter()
            .flat_map(|step_lines| {
                let step = step_lines.step;
                let weight = weights.get(step);
                step_lines.lines.into_iter().map(move |line| CompositeRow {
                    step,
                    name: line.name,
                    weighted_this_week: line.this_week * weight.this_week,
                    weighted_last_week: line.last_week * weight.last_week,
                    annotations: line.annotations,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.weighted_this_week
                .partial_cmp(&a.weighted_this_week)
                .unwrap_or(Ordering::Equal)
        });

        tracing::info!(
            configuration = %yields.configuration,
            package = %yields.package,
            rows = rows.len(),
            "Built composite pareto"
        );

        Ok(CompositeTable {
            configuration: yields.configuration,
            package: yields.package,
            weights,
            rows,
        })
    }
}
