use crate::error::ConfigError;
use chrono::{Datelike, Local};
use core_types::{CompositeSource, Configuration, Package, Step};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The root settings structure for a pareto run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub run: RunSettings,
    pub sources: SourceSettings,
    pub ingest: IngestSettings,
    pub composite: CompositeSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// What to report on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSettings {
    /// Product design ID the data was pulled for (e.g. "y32a"). Used in
    /// report titles and the export directory name.
    pub design_id: String,
    pub fab: Option<String>,
    /// Test work week, `YYYYWW`.
    pub tww: String,
    pub steps: Vec<Step>,
    pub configurations: Vec<Configuration>,
    pub packages: Vec<Package>,
    /// Week-to-date mode: report the latest, possibly incomplete, week.
    pub wtd: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            design_id: String::new(),
            fab: None,
            tww: current_work_week(),
            steps: Step::ALL.to_vec(),
            configurations: vec![Configuration::X8],
            packages: vec![Package::Sdp],
            wtd: false,
        }
    }
}

/// Where inputs are read from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Directory holding the extracted `<STEP>_<config>_<PACKAGE>.csv` tables.
    pub data_dir: PathBuf,
    /// Group-definition files, applied in order.
    pub grouping_files: Vec<PathBuf>,
    pub group_annotations: PathBuf,
    pub register_annotations: PathBuf,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("csv_files"),
            grouping_files: vec![PathBuf::from("define_groups.txt")],
            group_annotations: PathBuf::from("comments.txt"),
            register_annotations: PathBuf::from("reg_comments.txt"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Normalized register keys dropped from every table.
    pub exclude_rows: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositeSettings {
    pub source: CompositeSource,
}

/// A report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tables printed to the terminal.
    Table,
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::ValidationError(format!(
                "unknown output format '{other}' (expected table, csv or json)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            formats: vec![OutputFormat::Table],
        }
    }
}

impl OutputSettings {
    pub fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "pareto.log".to_string(),
        }
    }
}

/// Command-line overrides, applied on top of the file and environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Product design ID (e.g. y32a).
    #[cfg_attr(feature = "clap", arg(long))]
    pub design_id: Option<String>,

    /// Fab number.
    #[cfg_attr(feature = "clap", arg(long))]
    pub fab: Option<String>,

    /// Test work week, YYYYWW (e.g. 202125).
    #[cfg_attr(feature = "clap", arg(long))]
    pub tww: Option<String>,

    /// Steps to report, comma separated (e.g. PGSRT,BURN).
    #[cfg_attr(feature = "clap", arg(long, value_delimiter = ','))]
    pub steps: Vec<Step>,

    /// Configurations as stored in the source data (x4,x8,x16,combo).
    #[cfg_attr(feature = "clap", arg(long = "config", value_delimiter = ','))]
    pub configurations: Vec<Configuration>,

    /// Package types (SDP,DDP).
    #[cfg_attr(feature = "clap", arg(long = "package", value_delimiter = ','))]
    pub packages: Vec<Package>,

    /// Group-definition files, replacing the configured list.
    #[cfg_attr(feature = "clap", arg(long, value_delimiter = ','))]
    pub grouping_files: Vec<PathBuf>,

    /// Directory holding the extracted tables.
    #[cfg_attr(feature = "clap", arg(long))]
    pub data_dir: Option<PathBuf>,

    /// Week-to-date mode.
    #[cfg_attr(feature = "clap", arg(long))]
    pub wtd: bool,

    /// Rows ranked by the composite pareto (groups or registers).
    #[cfg_attr(feature = "clap", arg(long))]
    pub composite_source: Option<CompositeSource>,

    /// Directory the exports are written under.
    #[cfg_attr(feature = "clap", arg(long))]
    pub output_dir: Option<PathBuf>,

    /// Output formats, comma separated (table,csv,json).
    #[cfg_attr(feature = "clap", arg(long = "format", value_delimiter = ','))]
    pub formats: Vec<OutputFormat>,
}

impl Settings {
    /// Applies command-line overrides. Empty lists and unset options leave
    /// the loaded value alone.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(design_id) = overrides.design_id {
            self.run.design_id = design_id;
        }
        if overrides.fab.is_some() {
            self.run.fab = overrides.fab;
        }
        if let Some(tww) = overrides.tww {
            self.run.tww = tww;
        }
        if !overrides.steps.is_empty() {
            self.run.steps = overrides.steps;
        }
        if !overrides.configurations.is_empty() {
            self.run.configurations = overrides.configurations;
        }
        if !overrides.packages.is_empty() {
            self.run.packages = overrides.packages;
        }
        if overrides.wtd {
            self.run.wtd = true;
        }
        if !overrides.grouping_files.is_empty() {
            self.sources.grouping_files = overrides.grouping_files;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.sources.data_dir = data_dir;
        }
        if let Some(source) = overrides.composite_source {
            self.composite.source = source;
        }
        if let Some(directory) = overrides.output_dir {
            self.output.directory = directory;
        }
        if !overrides.formats.is_empty() {
            self.output.formats = overrides.formats;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.steps.is_empty() {
            return Err(ConfigError::ValidationError("run.steps is empty".to_string()));
        }
        if self.run.configurations.is_empty() {
            return Err(ConfigError::ValidationError("run.configurations is empty".to_string()));
        }
        if self.run.packages.is_empty() {
            return Err(ConfigError::ValidationError("run.packages is empty".to_string()));
        }
        if !is_work_week(&self.run.tww) {
            return Err(ConfigError::ValidationError(format!(
                "run.tww '{}' is not a YYYYWW work week",
                self.run.tww
            )));
        }
        Ok(())
    }

    /// Directory the exports of this run go to.
    pub fn export_dir(&self) -> PathBuf {
        let name = if self.run.design_id.is_empty() {
            format!("pareto_{}", self.run.tww)
        } else {
            format!("{}_pareto_{}", self.run.design_id, self.run.tww)
        };
        self.output.directory.join(name)
    }
}

/// The current ISO week as `YYYYWW`.
pub fn current_work_week() -> String {
    let week = Local::now().date_naive().iso_week();
    format!("{}{:02}", week.year(), week.week())
}

fn is_work_week(tww: &str) -> bool {
    tww.len() == 6
        && tww.bytes().all(|b| b.is_ascii_digit())
        && matches!(tww[4..].parse::<u32>(), Ok(1..=53))
}
