use crate::error::ReportError;
use crate::format::{fallout, week_header, weighted};
use accounting::AccountedFigures;
use composite::CompositeTable;
use core_types::CompositeSource;
use pareto_engine::{ParetoRun, StepPareto};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the whole-run JSON dump.
pub const RUN_JSON: &str = "pareto_run.json";

const ACCOUNTED_HEADERS: [&str; 2] = ["ACCOUNTED_YIELD", "ACCOUNTED_LAST_YIELD"];

fn create_dir(dir: &Path) -> Result<(), ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Accounted yield is written into the first data row only, in two trailing
/// columns.
fn accounted_cells(first: bool, figures: Option<&AccountedFigures>) -> [String; 2] {
    match (first, figures) {
        (true, Some(f)) => [f.this_week.to_string(), f.last_week.to_string()],
        _ => [String::new(), String::new()],
    }
}

/// Writes the register, group and breakout CSVs of one step. Returns the paths
/// written.
pub fn write_step_csv(
    dir: &Path,
    step: &StepPareto,
    group_columns: &[String],
    register_columns: &[String],
) -> Result<Vec<PathBuf>, ReportError> {
    let this_week = week_header(&step.weeks.this_week);
    let last_week = week_header(&step.weeks.last_week);
    let mut written = Vec::new();

    let path = dir.join(format!("{}_registers.csv", step.key));
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["REGISTER".to_string(), this_week.clone(), last_week.clone()];
    header.extend(register_columns.iter().cloned());
    header.extend(ACCOUNTED_HEADERS.iter().map(|h| h.to_string()));
    writer.write_record(&header)?;
    for (idx, register) in step.registers.iter().enumerate() {
        let mut row = vec![
            register.register.clone(),
            fallout(register.this_week),
            fallout(register.last_week),
        ];
        row.extend(register.annotations.iter().cloned());
        row.extend(accounted_cells(idx == 0, Some(&step.accounted.registers)));
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    written.push(path);

    let Some(groups) = &step.groups else {
        return Ok(written);
    };

    let path = dir.join(format!("{}_groups.csv", step.key));
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["GROUP".to_string(), this_week.clone(), last_week.clone(), "REGISTERS".to_string()];
    header.extend(group_columns.iter().cloned());
    header.extend(ACCOUNTED_HEADERS.iter().map(|h| h.to_string()));
    writer.write_record(&header)?;
    for (idx, group) in groups.iter().enumerate() {
        let mut row = vec![
            group.group.clone(),
            fallout(Some(group.this_week)),
            fallout(Some(group.last_week)),
            group.members.to_string(),
        ];
        row.extend(group.annotations.iter().cloned());
        row.extend(accounted_cells(idx == 0, step.accounted.groups.as_ref()));
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    written.push(path);

    let path = dir.join(format!("{}_breakout.csv", step.key));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["GROUP".to_string(), "REGISTER".to_string(), this_week, last_week])?;
    for row in &step.breakout {
        writer.write_record([
            row.group.clone(),
            row.register.clone(),
            fallout(row.this_week),
            fallout(row.last_week),
        ])?;
    }
    for register in &step.ungrouped {
        writer.write_record([String::new(), register.clone(), String::new(), String::new()])?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    written.push(path);

    Ok(written)
}

/// Writes `overall_<config>_<PACKAGE>.csv`.
pub fn write_composite_csv(
    dir: &Path,
    composite: &CompositeTable,
    source: CompositeSource,
    columns: &[String],
) -> Result<PathBuf, ReportError> {
    let path = dir.join(format!("overall_{}_{}.csv", composite.configuration, composite.package));
    let mut writer = csv::Writer::from_path(&path)?;

    let name_column = match source {
        CompositeSource::Groups => "GROUP",
        CompositeSource::Registers => "REGISTER",
    };
    let mut header = vec![
        "STEP".to_string(),
        name_column.to_string(),
        "WEIGHTED".to_string(),
        "WEIGHTED_LAST_WW".to_string(),
    ];
    header.extend(columns.iter().cloned());
    writer.write_record(&header)?;

    for row in &composite.rows {
        let mut cells = vec![
            row.step.to_string(),
            row.name.clone(),
            weighted(row.weighted_this_week),
            weighted(row.weighted_last_week),
        ];
        cells.extend(row.annotations.iter().cloned());
        writer.write_record(&cells)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Dumps the whole run as pretty JSON.
pub fn write_json(dir: &Path, run: &ParetoRun) -> Result<PathBuf, ReportError> {
    let path = dir.join(RUN_JSON);
    let file = File::create(&path).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, run)?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes the requested exports of a run under `dir`, creating it if needed.
pub fn export_run(dir: &Path, run: &ParetoRun, csv: bool, json: bool) -> Result<Vec<PathBuf>, ReportError> {
    if !csv && !json {
        return Ok(Vec::new());
    }
    create_dir(dir)?;

    let mut written = Vec::new();
    if csv {
        for step in &run.steps {
            written.extend(write_step_csv(dir, step, &run.group_columns, &run.register_columns)?);
        }
        for composite in &run.composites {
            written.push(write_composite_csv(dir, composite, run.source, run.composite_columns())?);
        }
    }
    if json {
        written.push(write_json(dir, run)?);
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "Exported pareto run");
    Ok(written)
}
