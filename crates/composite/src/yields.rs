use crate::error::CompositeError;
use core_types::{Configuration, Package, Step, StepTable, Week, YieldRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// The yield of every step for one (configuration, package).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepYields {
    pub configuration: Configuration,
    pub package: Package,
    yields: BTreeMap<Step, YieldRow>,
}

impl StepYields {
    pub fn new(configuration: Configuration, package: Package) -> Self {
        Self {
            configuration,
            package,
            yields: BTreeMap::new(),
        }
    }

    /// Collects the yield rows of the tables belonging to this
    /// (configuration, package). Tables of other combinations are ignored.
    pub fn from_tables<'a, I>(configuration: Configuration, package: Package, tables: I) -> Self
    where
        I: IntoIterator<Item = &'a StepTable>,
    {
        let mut yields = Self::new(configuration, package);
        for table in tables {
            let key = table.key();
            if key.configuration != configuration || key.package != package {
                continue;
            }
            if let Some(row) = table.yield_row() {
                yields.insert(key.step, *row);
            }
        }
        yields
    }

    pub fn insert(&mut self, step: Step, row: YieldRow) {
        if self.yields.insert(step, row).is_some() {
            tracing::warn!(
                step = %step,
                configuration = %self.configuration,
                package = %self.package,
                "Step yield given twice; keeping the latest."
            );
        }
    }

    pub fn get(&self, step: Step) -> Option<&YieldRow> {
        self.yields.get(&step)
    }

    fn require(&self, step: Step, week: Week) -> Result<f64, CompositeError> {
        self.get(step)
            .and_then(|row| row.get(week))
            .ok_or(CompositeError::IncompleteYields {
                configuration: self.configuration,
                package: self.package,
                step,
                week,
            })
    }

    /// Downstream yield-chain weights of every step.
    ///
    /// All four steps must carry a yield for both weeks, otherwise the first
    /// gap (in step order, this week before last week) is reported.
    pub fn weights(&self) -> Result<StepWeights, CompositeError> {
        let mut yields = BTreeMap::new();
        for step in Step::ALL {
            let this_week = self.require(step, Week::ThisWeek)?;
            let last_week = self.require(step, Week::LastWeek)?;
            yields.insert(step, (this_week, last_week));
        }

        let weights = Step::ALL
            .iter()
            .map(|&step| {
                let (this_week, last_week) = step
                    .downstream()
                    .iter()
                    .filter_map(|t| yields.get(t))
                    .fold((1.0, 1.0), |(tw, lw), (ytw, ylw)| (tw * ytw / 100.0, lw * ylw / 100.0));
                (step, WeekWeights { this_week, last_week })
            })
            .collect();

        Ok(StepWeights { weights })
    }
}

/// The pair of weights applied to one step's fallout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekWeights {
    pub this_week: f64,
    pub last_week: f64,
}

/// weight(s) = product of (yield / 100) over the steps strictly downstream of s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepWeights {
    weights: BTreeMap<Step, WeekWeights>,
}

impl StepWeights {
    pub fn get(&self, step: Step) -> WeekWeights {
        self.weights.get(&step).copied().unwrap_or(WeekWeights {
            this_week: 1.0,
            last_week: 1.0,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, WeekWeights)> + '_ {
        self.weights.iter().map(|(s, w)| (*s, *w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(pgsrt: f64, burn: f64, hsrt: f64, cfin: f64) -> StepYields {
        let mut yields = StepYields::new(Configuration::X8, Package::Sdp);
        yields.insert(Step::Pgsrt, YieldRow::new(Some(pgsrt), Some(pgsrt)));
        yields.insert(Step::Burn, YieldRow::new(Some(burn), Some(burn)));
        yields.insert(Step::Hsrt, YieldRow::new(Some(hsrt), Some(hsrt)));
        yields.insert(Step::Cfin, YieldRow::new(Some(cfin), Some(cfin)));
        yields
    }

    #[test]
    fn burn_weight_is_the_downstream_chain() {
        let weights = chain(90.0, 95.0, 98.0, 99.0).weights().unwrap();
        assert!((weights.get(Step::Burn).this_week - 0.9702).abs() < 1e-12);
        assert!((weights.get(Step::Hsrt).this_week - 0.99).abs() < 1e-12);
        assert_eq!(weights.get(Step::Cfin).this_week, 1.0);
        assert_eq!(weights.get(Step::Cfin).last_week, 1.0);
    }

    #[test]
    fn weeks_use_their_own_yields() {
        let mut yields = chain(90.0, 95.0, 98.0, 99.0);
        yields.insert(Step::Cfin, YieldRow::new(Some(99.0), Some(50.0)));
        let weights = yields.weights().unwrap();
        assert!((weights.get(Step::Hsrt).this_week - 0.99).abs() < 1e-12);
        assert!((weights.get(Step::Hsrt).last_week - 0.5).abs() < 1e-12);
    }

    #[test]
    fn missing_step_names_the_gap() {
        let mut yields = StepYields::new(Configuration::X16, Package::Ddp);
        yields.insert(Step::Pgsrt, YieldRow::new(Some(90.0), Some(90.0)));
        yields.insert(Step::Burn, YieldRow::new(Some(95.0), Some(95.0)));
        yields.insert(Step::Hsrt, YieldRow::new(Some(98.0), Some(98.0)));

        let err = yields.weights().unwrap_err();
        assert_eq!(
            err,
            CompositeError::IncompleteYields {
                configuration: Configuration::X16,
                package: Package::Ddp,
                step: Step::Cfin,
                week: Week::ThisWeek,
            }
        );
        assert_eq!(err.to_string(), "Incomplete yields for x16 DDP: CFIN has no this week yield");
    }

    #[test]
    fn missing_last_week_value_is_incomplete() {
        let mut yields = chain(90.0, 95.0, 98.0, 99.0);
        yields.insert(Step::Burn, YieldRow::new(Some(95.0), None));
        assert!(matches!(
            yields.weights(),
            Err(CompositeError::IncompleteYields {
                step: Step::Burn,
                week: Week::LastWeek,
                ..
            })
        ));
    }
}
