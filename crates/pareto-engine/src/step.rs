use accounting::AccountedYields;
use core_types::{TableKey, WeekLabels, YieldRow};
use serde::Serialize;
use std::cmp::Ordering;

/// A register line of a step pareto.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegister {
    pub register: String,
    pub this_week: Option<f64>,
    pub last_week: Option<f64>,
    pub annotations: Vec<String>,
}

/// A group line of a step pareto.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub group: String,
    pub this_week: f64,
    pub last_week: f64,
    pub members: usize,
    pub annotations: Vec<String>,
}

/// One register of the register-to-group breakout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutRow {
    pub group: String,
    pub register: String,
    pub this_week: Option<f64>,
    pub last_week: Option<f64>,
}

/// Everything reported for one (step, configuration, package).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPareto {
    pub key: TableKey,
    pub weeks: WeekLabels,
    pub yield_row: Option<YieldRow>,
    /// Highest this-week fallout first; unmeasured registers last.
    pub registers: Vec<RankedRegister>,
    /// `None` when no group rule applies to the step.
    pub groups: Option<Vec<RankedGroup>>,
    /// Members of each group, following the group ranking.
    pub breakout: Vec<BreakoutRow>,
    pub ungrouped: Vec<String>,
    pub accounted: AccountedYields,
}

/// Descending by value with unmeasured values last. Stable under `sort_by`.
pub(crate) fn rank_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
