//! # Yield Accounting
//!
//! A data-completeness check for each pulled table: the step's yield plus all
//! of the fallout attributed to registers (or groups) should come back to
//! roughly 100%. The gap shows how much fallout the pareto is not explaining.
//!
//! "No data collected" and "nothing measurable" must stay distinguishable, so
//! the figure is an [`AccountedYield`] rather than a bare number.

use core_types::{FalloutRecord, GroupRecord, StepTable, Week, YieldRow};
use serde::Serialize;
use std::fmt;

/// An accounted-yield figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AccountedYield {
    /// Yield plus summed fallout, in percent.
    Value(f64),
    /// No yield row, or no usable fallout rows to add to it.
    NoData,
    /// The sum could not be computed (the yield value itself is missing).
    Null,
}

impl AccountedYield {
    pub fn value(&self) -> Option<f64> {
        match self {
            AccountedYield::Value(v) => Some(*v),
            AccountedYield::NoData | AccountedYield::Null => None,
        }
    }
}

impl fmt::Display for AccountedYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountedYield::Value(v) => write!(f, "{v:.2}"),
            AccountedYield::NoData => f.write_str("-"),
            AccountedYield::Null => f.write_str("NULL"),
        }
    }
}

/// Accounted yield for both reported weeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccountedFigures {
    pub this_week: AccountedYield,
    pub last_week: AccountedYield,
}

/// Accounted yield of one table, over registers and (when grouped) over groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccountedYields {
    pub registers: AccountedFigures,
    pub groups: Option<AccountedFigures>,
}

/// A stateless calculator reconciling step yield with summed fallout.
#[derive(Debug, Default)]
pub struct YieldAccountant {}

impl YieldAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles a table's yield with its register fallout and, when the
    /// step was grouped, with its group fallout.
    pub fn reconcile(&self, table: &StepTable, groups: Option<&[GroupRecord]>) -> AccountedYields {
        let yield_row = table.yield_row();
        if yield_row.is_none() {
            tracing::warn!(table = %table.key(), "No YIELD row; accounted yield reported as no data.");
        }

        let registers = self.for_registers(yield_row, table.records());
        let groups = groups.map(|g| self.for_groups(yield_row, g));

        tracing::debug!(table = %table.key(), ?registers, ?groups, "Accounted yield");
        AccountedYields { registers, groups }
    }

    pub fn for_registers(&self, yield_row: Option<&YieldRow>, records: &[FalloutRecord]) -> AccountedFigures {
        AccountedFigures {
            this_week: account(yield_row, Week::ThisWeek, records.iter().map(|r| r.this_week)),
            last_week: account(yield_row, Week::LastWeek, records.iter().map(|r| r.last_week)),
        }
    }

    pub fn for_groups(&self, yield_row: Option<&YieldRow>, groups: &[GroupRecord]) -> AccountedFigures {
        AccountedFigures {
            this_week: account(yield_row, Week::ThisWeek, groups.iter().map(|g| Some(g.this_week))),
            last_week: account(yield_row, Week::LastWeek, groups.iter().map(|g| Some(g.last_week))),
        }
    }
}

fn account<I>(yield_row: Option<&YieldRow>, week: Week, fallouts: I) -> AccountedYield
where
    I: IntoIterator<Item = Option<f64>>,
{
    let Some(yield_row) = yield_row else {
        return AccountedYield::NoData;
    };

    let (usable, fallout) = fallouts
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0usize, 0.0f64), |(n, sum), v| (n + 1, sum + v));
    if usable == 0 {
        return AccountedYield::NoData;
    }

    let total = yield_row.get(week).unwrap_or(f64::NAN) + fallout;
    if total.is_nan() {
        AccountedYield::Null
    } else {
        AccountedYield::Value(total)
    }
}
