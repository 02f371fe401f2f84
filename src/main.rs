use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use configuration::{LoggingSettings, OutputFormat, Overrides, Settings};
use core_types::{Step, TableKey};
use indicatif::{ProgressBar, ProgressStyle};
use ingest::IngestOptions;
use pareto_engine::{ParetoContext, ParetoEngine, SourceText};
use std::path::{Path, PathBuf};

/// The main entry point for the weekly fallout pareto tool.
fn main() -> Result<()> {
    // A .env file is optional; it only supplies PARETO__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Normalize(args) => handle_normalize(args),
        Commands::Check(args) => handle_check(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Builds per-step and overall yield paretos from extracted fallout tables.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every pareto of a run, print it and write the exports.
    Run(RunArgs),
    /// Print the normalized register key of raw identifiers.
    Normalize(NormalizeArgs),
    /// Parse the group and annotation files and summarize them.
    Check(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Settings file (defaults to ./pareto.toml when present).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Parser)]
struct NormalizeArgs {
    /// Raw register identifiers, e.g. "PGSRT|X8_SDP_TRIM_VPP_REG".
    #[arg(required = true)]
    ids: Vec<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_settings(args: RunArgs) -> Result<Settings> {
    let mut settings =
        configuration::load_settings(args.settings.as_deref()).context("Failed to load settings")?;
    settings.apply(args.overrides);
    settings.validate().context("Invalid settings after command-line overrides")?;
    Ok(settings)
}

fn read_source(path: &Path) -> Result<Option<SourceText>> {
    let text = configuration::read_optional(path)?;
    Ok(text.map(|t| SourceText::new(path.display().to_string(), t)))
}

/// Loads group rules and annotations. Absent files are skipped.
fn load_context(settings: &Settings) -> Result<ParetoContext> {
    let mut rule_sources = Vec::new();
    for path in &settings.sources.grouping_files {
        if let Some(source) = read_source(path)? {
            rule_sources.push(source);
        }
    }
    let group_notes = read_source(&settings.sources.group_annotations)?;
    let register_notes = read_source(&settings.sources.register_annotations)?;

    ParetoContext::load(&rule_sources, group_notes.as_ref(), register_notes.as_ref())
        .context("Failed to load group or annotation definitions")
}

/// Every (step, configuration, package) of the run, steps outermost.
fn table_keys(settings: &Settings) -> Vec<TableKey> {
    let mut keys = Vec::new();
    for &step in &settings.run.steps {
        for &configuration in &settings.run.configurations {
            for &package in &settings.run.packages {
                keys.push(TableKey::new(step, configuration, package));
            }
        }
    }
    keys
}

fn handle_run(args: RunArgs) -> Result<()> {
    let settings = load_settings(args)?;
    let _guard = configuration::init_tracing(&settings.logging)?;

    tracing::info!(
        design_id = %settings.run.design_id,
        fab = ?settings.run.fab,
        tww = %settings.run.tww,
        wtd = settings.run.wtd,
        "Starting pareto run"
    );

    let context = load_context(&settings)?;
    let options = IngestOptions {
        wtd: settings.run.wtd,
        exclude_rows: settings.ingest.exclude_rows.clone(),
    };

    let keys = table_keys(&settings);
    let progress_bar = ProgressBar::new(keys.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let tables = ingest::load_all(&settings.sources.data_dir, &keys, &options, |key| {
        progress_bar.set_message(key.to_string());
        progress_bar.inc(1);
    })
    .context("Failed to read step tables")?;
    progress_bar.finish_with_message("Tables loaded");

    if tables.is_empty() {
        bail!("No tables found under {}", settings.sources.data_dir.display());
    }

    let run = ParetoEngine::new(&context, settings.composite.source).run(&tables)?;

    if settings.output.wants(OutputFormat::Table) {
        println!("{}", report::render_run(&run));
    }

    let written = report::export_run(
        &settings.export_dir(),
        &run,
        settings.output.wants(OutputFormat::Csv),
        settings.output.wants(OutputFormat::Json),
    )?;
    for path in written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_normalize(args: NormalizeArgs) -> Result<()> {
    let _guard = configuration::init_tracing(&LoggingSettings::default())?;
    for id in &args.ids {
        println!("{id}\t{}", normalizer::normalize(id));
    }
    Ok(())
}

fn handle_check(args: RunArgs) -> Result<()> {
    let settings = load_settings(args)?;
    let _guard = configuration::init_tracing(&settings.logging)?;
    let context = load_context(&settings)?;

    println!("Group rules: {}", context.rules.len());
    for step in Step::ALL {
        let names: Vec<String> = context.rules.rules_for(step).into_iter().map(|r| r.name).collect();
        let origin = context.rules.origin_for(step).unwrap_or("-");
        println!("  {step} ({origin}): {} group(s) {}", names.len(), names.join(", "));
    }

    for notes in [&context.group_notes, &context.register_notes] {
        if notes.columns().is_empty() {
            continue;
        }
        println!(
            "Annotations {}: {} entr(ies), columns {}",
            notes.origin(),
            notes.entries().len(),
            notes.columns().join("^")
        );
    }

    Ok(())
}
