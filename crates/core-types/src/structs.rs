use crate::enums::{Configuration, Package, Step, Week};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The key of the synthetic row carrying a step's overall yield.
pub const YIELD_ROW_KEY: &str = "YIELD";

/// Identifies one pulled table: a step, for one configuration and package type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub step: Step,
    pub configuration: Configuration,
    pub package: Package,
}

impl TableKey {
    pub fn new(step: Step, configuration: Configuration, package: Package) -> Self {
        Self {
            step,
            configuration,
            package,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.step, self.configuration, self.package)
    }
}

/// Drops NaN so that "not measured" is always represented as `None`.
pub fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Fallout of a single register for the two reported weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalloutRecord {
    pub register: String,
    pub this_week: Option<f64>,
    pub last_week: Option<f64>,
}

impl FalloutRecord {
    pub fn new(register: impl Into<String>, this_week: Option<f64>, last_week: Option<f64>) -> Self {
        Self {
            register: register.into(),
            this_week: measured(this_week),
            last_week: measured(last_week),
        }
    }

    pub fn fallout(&self, week: Week) -> Option<f64> {
        match week {
            Week::ThisWeek => self.this_week,
            Week::LastWeek => self.last_week,
        }
    }
}

/// Overall yield percentage of a step for the two reported weeks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldRow {
    pub this_week: Option<f64>,
    pub last_week: Option<f64>,
}

impl YieldRow {
    pub fn new(this_week: Option<f64>, last_week: Option<f64>) -> Self {
        Self {
            this_week: measured(this_week),
            last_week: measured(last_week),
        }
    }

    pub fn get(&self, week: Week) -> Option<f64> {
        match week {
            Week::ThisWeek => self.this_week,
            Week::LastWeek => self.last_week,
        }
    }
}

/// Labels of the two week columns a table was read from (e.g. `"202125"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekLabels {
    pub this_week: String,
    pub last_week: String,
}

/// The normalized fallout table of one (step, configuration, package).
///
/// Register keys are unique within a table. The table cannot be changed after
/// construction; classification works on its own view of the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTable {
    key: TableKey,
    weeks: WeekLabels,
    records: Vec<FalloutRecord>,
    yield_row: Option<YieldRow>,
}

impl StepTable {
    pub fn new(
        key: TableKey,
        weeks: WeekLabels,
        records: Vec<FalloutRecord>,
        yield_row: Option<YieldRow>,
    ) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.register == YIELD_ROW_KEY {
                return Err(CoreError::InvalidInput(
                    key.to_string(),
                    "the YIELD row must be passed as the yield row, not as a register".to_string(),
                ));
            }
            if !seen.insert(record.register.as_str()) {
                return Err(CoreError::DuplicateRegister {
                    register: record.register.clone(),
                    table: key.to_string(),
                });
            }
        }

        tracing::debug!(table = %key, registers = records.len(), "Constructed step table");

        Ok(Self {
            key,
            weeks,
            records,
            yield_row,
        })
    }

    pub fn key(&self) -> TableKey {
        self.key
    }

    pub fn weeks(&self) -> &WeekLabels {
        &self.weeks
    }

    pub fn records(&self) -> &[FalloutRecord] {
        &self.records
    }

    pub fn yield_row(&self) -> Option<&YieldRow> {
        self.yield_row.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Summed fallout of one user-defined group at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group: String,
    pub this_week: f64,
    pub last_week: f64,
}

impl GroupRecord {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            this_week: 0.0,
            last_week: 0.0,
        }
    }

    pub fn fallout(&self, week: Week) -> f64 {
        match week {
            Week::ThisWeek => self.this_week,
            Week::LastWeek => self.last_week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key() -> TableKey {
        TableKey::new(Step::Burn, Configuration::X8, Package::Sdp)
    }

    #[test]
    fn nan_fallout_is_stored_as_missing() {
        let record = FalloutRecord::new("REG1", Some(f64::NAN), Some(1.5));
        assert_eq!(record.this_week, None);
        assert_eq!(record.last_week, Some(1.5));
    }

    #[test]
    fn duplicate_registers_are_rejected() {
        let records = vec![
            FalloutRecord::new("REG1", Some(1.0), None),
            FalloutRecord::new("REG1", Some(2.0), None),
        ];
        let err = StepTable::new(key(), WeekLabels::default(), records, None).unwrap_err();
        assert_eq!(
            err,
            CoreError::DuplicateRegister {
                register: "REG1".to_string(),
                table: "BURN_x8_SDP".to_string(),
            }
        );
    }

    #[test]
    fn yield_row_cannot_be_a_register() {
        let records = vec![FalloutRecord::new(YIELD_ROW_KEY, Some(95.0), None)];
        assert!(StepTable::new(key(), WeekLabels::default(), records, None).is_err());
    }

    #[test]
    fn table_key_display_matches_file_stem() {
        assert_eq!(key().to_string(), "BURN_x8_SDP");
    }
}
