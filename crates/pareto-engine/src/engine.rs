use crate::context::ParetoContext;
use crate::error::ParetoError;
use crate::step::{rank_desc, BreakoutRow, RankedGroup, RankedRegister, StepPareto};
use accounting::YieldAccountant;
use composite::{
    CompositeError, CompositeTable, CompositeWeightEngine, FalloutLine, StepLines, StepYields,
};
use core_types::{CompositeSource, Configuration, Package, StepTable};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A composite that could not be built. Its step paretos are still valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeFailure {
    pub configuration: Configuration,
    pub package: Package,
    pub error: CompositeError,
}

/// The result of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRun {
    pub source: CompositeSource,
    pub group_columns: Vec<String>,
    pub register_columns: Vec<String>,
    pub steps: Vec<StepPareto>,
    pub composites: Vec<CompositeTable>,
    pub composite_failures: Vec<CompositeFailure>,
}

impl ParetoRun {
    /// Annotation columns carried by the composite rows.
    pub fn composite_columns(&self) -> &[String] {
        match self.source {
            CompositeSource::Groups => &self.group_columns,
            CompositeSource::Registers => &self.register_columns,
        }
    }
}

/// Builds step paretos and composites against one shared context.
pub struct ParetoEngine<'a> {
    context: &'a ParetoContext,
    source: CompositeSource,
    accountant: YieldAccountant,
    composite: CompositeWeightEngine,
}

impl<'a> ParetoEngine<'a> {
    pub fn new(context: &'a ParetoContext, source: CompositeSource) -> Self {
        Self {
            context,
            source,
            accountant: YieldAccountant::new(),
            composite: CompositeWeightEngine::new(),
        }
    }

    /// Builds the ranked pareto of one table.
    pub fn build_step(&self, table: &StepTable) -> StepPareto {
        let key = table.key();
        let annotate_register =
            |register: &str| self.context.register_notes.values_for(register, key.step, key.configuration);
        let annotate_group =
            |group: &str| self.context.group_notes.values_for(group, key.step, key.configuration);

        let mut registers: Vec<RankedRegister> = table
            .records()
            .iter()
            .map(|r| RankedRegister {
                register: r.register.clone(),
                this_week: r.this_week,
                last_week: r.last_week,
                annotations: annotate_register(&r.register),
            })
            .collect();
        registers.sort_by(|a, b| rank_desc(a.this_week, b.this_week));

        let (groups, breakout, ungrouped, accounted) = match self.context.rules.classifier_for(key.step) {
            Some(classifier) => {
                let classification = classifier.classify_table(table);
                let records: Vec<_> = classification.records().cloned().collect();
                let accounted = self.accountant.reconcile(table, Some(records.as_slice()));

                let mut outcomes = classification.groups;
                outcomes.sort_by(|a, b| rank_desc(Some(a.record.this_week), Some(b.record.this_week)));

                let lookup: HashMap<&str, _> =
                    table.records().iter().map(|r| (r.register.as_str(), r)).collect();
                let by_register = &lookup;
                let breakout = outcomes
                    .iter()
                    .flat_map(move |outcome| {
                        outcome.members.iter().filter_map(move |member| {
                            by_register.get(member.as_str()).map(|r| BreakoutRow {
                                group: outcome.record.group.clone(),
                                register: r.register.clone(),
                                this_week: r.this_week,
                                last_week: r.last_week,
                            })
                        })
                    })
                    .collect();

                let groups = outcomes
                    .iter()
                    .map(|outcome| RankedGroup {
                        group: outcome.record.group.clone(),
                        this_week: outcome.record.this_week,
                        last_week: outcome.record.last_week,
                        members: outcome.members.len(),
                        annotations: annotate_group(&outcome.record.group),
                    })
                    .collect();

                (Some(groups), breakout, classification.ungrouped, accounted)
            }
            None => {
                tracing::debug!(table = %key, "No group rules apply; registers only.");
                (None, Vec::new(), Vec::new(), self.accountant.reconcile(table, None))
            }
        };

        StepPareto {
            key,
            weeks: table.weeks().clone(),
            yield_row: table.yield_row().copied(),
            registers,
            groups,
            breakout,
            ungrouped,
            accounted,
        }
    }

    /// Builds the cross-step composite of one (configuration, package) from
    /// its step paretos and tables.
    pub fn build_composite(
        &self,
        configuration: Configuration,
        package: Package,
        tables: &[&StepTable],
        steps: &[&StepPareto],
    ) -> Result<CompositeTable, ParetoError> {
        let yields = StepYields::from_tables(configuration, package, tables.iter().copied());

        let lines = steps
            .iter()
            .filter(|s| s.key.configuration == configuration && s.key.package == package)
            .map(|s| StepLines::new(s.key.step, self.composite_lines(s)))
            .collect();

        Ok(self.composite.combine(&yields, lines)?)
    }

    fn composite_lines(&self, step: &StepPareto) -> Vec<FalloutLine> {
        match self.source {
            CompositeSource::Groups => step
                .groups
                .iter()
                .flatten()
                .map(|g| FalloutLine::new(g.group.clone(), g.this_week, g.last_week).with_annotations(g.annotations.clone()))
                .collect(),
            CompositeSource::Registers => step
                .registers
                .iter()
                .map(|r| {
                    FalloutLine::new(r.register.clone(), r.this_week.unwrap_or(0.0), r.last_week.unwrap_or(0.0))
                        .with_annotations(r.annotations.clone())
                })
                .collect(),
        }
    }

    /// Builds every step pareto, then one composite per (configuration,
    /// package) present. A composite that lacks yields is recorded as a
    /// failure and does not stop the run.
    pub fn run(&self, tables: &[StepTable]) -> Result<ParetoRun, ParetoError> {
        let mut seen = HashSet::with_capacity(tables.len());
        for table in tables {
            if !seen.insert(table.key()) {
                return Err(ParetoError::DuplicateTable(table.key().to_string()));
            }
        }

        let steps: Vec<StepPareto> = tables.iter().map(|t| self.build_step(t)).collect();

        let mut combinations: BTreeMap<(Configuration, Package), (Vec<&StepTable>, Vec<&StepPareto>)> =
            BTreeMap::new();
        for (table, step) in tables.iter().zip(&steps) {
            let key = table.key();
            let entry = combinations.entry((key.configuration, key.package)).or_default();
            entry.0.push(table);
            entry.1.push(step);
        }

        let mut composites = Vec::new();
        let mut composite_failures = Vec::new();
        for ((configuration, package), (tables, steps)) in combinations {
            match self.build_composite(configuration, package, &tables, &steps) {
                Ok(table) => composites.push(table),
                Err(ParetoError::Composite(error)) => {
                    tracing::warn!(%configuration, %package, %error, "Skipping composite pareto.");
                    composite_failures.push(CompositeFailure {
                        configuration,
                        package,
                        error,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            steps = steps.len(),
            composites = composites.len(),
            failed = composite_failures.len(),
            "Pareto run complete"
        );

        Ok(ParetoRun {
            source: self.source,
            group_columns: self.context.group_notes.columns().to_vec(),
            register_columns: self.context.register_notes.columns().to_vec(),
            steps,
            composites,
            composite_failures,
        })
    }
}
