use crate::error::IngestError;
use core_types::{FalloutRecord, StepTable, TableKey, WeekLabels, YieldRow, YIELD_ROW_KEY};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// How extracted tables are read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Week-to-date mode: the newest week column is this week.
    pub wtd: bool,
    /// Register keys (normalized) dropped from every table.
    pub exclude_rows: Vec<String>,
}

impl IngestOptions {
    /// Header positions of (last week, this week). Position 0 is the register.
    fn week_columns(&self) -> (usize, usize) {
        if self.wtd { (2, 3) } else { (1, 2) }
    }
}

/// `<data_dir>/<STEP>_<config>_<PACKAGE>.csv`
pub fn table_path(data_dir: &Path, key: TableKey) -> PathBuf {
    data_dir.join(format!("{key}.csv"))
}

/// Reads one extracted table from disk.
pub fn load_step_table(path: &Path, key: TableKey, options: &IngestOptions) -> Result<StepTable, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_step_table(file, &path.display().to_string(), key, options)
}

/// Reads every requested table found under `data_dir`, in the given order.
/// Tables with no file are skipped with a warning.
///
/// `on_key` is called before each key is read, whether or not its file exists.
pub fn load_all(
    data_dir: &Path,
    keys: &[TableKey],
    options: &IngestOptions,
    mut on_key: impl FnMut(TableKey),
) -> Result<Vec<StepTable>, IngestError> {
    let mut tables = Vec::with_capacity(keys.len());
    for &key in keys {
        on_key(key);
        let path = table_path(data_dir, key);
        if !path.is_file() {
            tracing::warn!(table = %key, path = %path.display(), "Table file not found; skipping.");
            continue;
        }
        tables.push(load_step_table(&path, key, options)?);
    }
    Ok(tables)
}

/// Reads a transposed table: a `REGISTER,<week>,<week>,...` header followed by
/// one row per register plus a `YIELD` row.
pub fn read_step_table<R: Read>(
    reader: R,
    origin: &str,
    key: TableKey,
    options: &IngestOptions,
) -> Result<StepTable, IngestError> {
    let csv_error = |source| IngestError::Csv {
        origin: origin.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let (last_col, this_col) = options.week_columns();
    if headers.len() <= this_col {
        return Err(IngestError::MissingWeekColumns {
            origin: origin.to_string(),
            expected: this_col,
            found: headers.len().saturating_sub(1),
        });
    }
    let weeks = WeekLabels {
        this_week: headers.get(this_col).unwrap_or_default().to_string(),
        last_week: headers.get(last_col).unwrap_or_default().to_string(),
    };

    let excluded: HashSet<String> = options.exclude_rows.iter().map(|r| normalizer::normalize(r)).collect();
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut yield_row = None;

    for (idx, result) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based lines.
        let line = idx + 2;
        let row = result.map_err(csv_error)?;

        let register = normalizer::normalize(row.get(0).unwrap_or_default());
        if register.is_empty() {
            tracing::debug!(origin, line, "Skipping row without a register name");
            continue;
        }

        let this_week = cell(&row, this_col, origin, line);
        let last_week = cell(&row, last_col, origin, line);

        if register == YIELD_ROW_KEY {
            if yield_row.is_some() {
                tracing::warn!(origin, line, "Duplicate YIELD row; keeping the first.");
            } else {
                yield_row = Some(YieldRow::new(this_week, last_week));
            }
            continue;
        }
        if excluded.contains(&register) {
            tracing::debug!(origin, line, register = %register, "Excluded row");
            continue;
        }
        if !seen.insert(register.clone()) {
            tracing::warn!(origin, line, register = %register, "Register repeats after normalization; keeping the first row.");
            continue;
        }

        records.push(FalloutRecord::new(register, this_week, last_week));
    }

    tracing::info!(
        table = %key,
        origin,
        registers = records.len(),
        has_yield = yield_row.is_some(),
        "Loaded step table"
    );

    Ok(StepTable::new(key, weeks, records, yield_row)?)
}

/// A fallout cell: empty, `nan` and `-` are unmeasured.
fn cell(row: &csv::StringRecord, column: usize, origin: &str, line: usize) -> Option<f64> {
    let raw = row.get(column).unwrap_or_default();
    if raw.is_empty() || raw == "-" || raw.eq_ignore_ascii_case("nan") {
        return None;
    }
    match raw.trim_end_matches('%').parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(origin, line, column, value = raw, "Unparseable fallout value; treating it as unmeasured.");
            None
        }
    }
}
