use crate::format::{fallout, week_header, weighted};
use accounting::AccountedFigures;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use composite::CompositeTable;
use pareto_engine::{CompositeFailure, ParetoRun, StepPareto};

fn table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn accounted_line(label: &str, figures: &AccountedFigures) -> String {
    format!(
        "Accounted yield ({label}): {} this week, {} last week",
        figures.this_week, figures.last_week
    )
}

/// Renders the register table, group table and accounted yields of one step.
pub fn render_step(step: &StepPareto, group_columns: &[String], register_columns: &[String]) -> String {
    let this_week = week_header(&step.weeks.this_week);
    let last_week = week_header(&step.weeks.last_week);
    let mut out = format!("== {} ==\n", step.key);

    if let Some(groups) = &step.groups {
        let mut header = vec!["GROUP".to_string(), this_week.clone(), last_week.clone(), "REGISTERS".to_string()];
        header.extend(group_columns.iter().cloned());
        let mut t = table(header);
        for group in groups {
            let mut row = vec![
                group.group.clone(),
                fallout(Some(group.this_week)),
                fallout(Some(group.last_week)),
                group.members.to_string(),
            ];
            row.extend(group.annotations.iter().cloned());
            t.add_row(row);
        }
        out.push_str(&format!("{t}\n"));
        if let Some(figures) = &step.accounted.groups {
            out.push_str(&accounted_line("groups", figures));
            out.push('\n');
        }
        if !step.ungrouped.is_empty() {
            out.push_str(&format!("Ungrouped registers: {}\n", step.ungrouped.len()));
        }
    }

    let mut header = vec!["REGISTER".to_string(), this_week, last_week];
    header.extend(register_columns.iter().cloned());
    let mut t = table(header);
    for register in &step.registers {
        let mut row = vec![
            register.register.clone(),
            fallout(register.this_week),
            fallout(register.last_week),
        ];
        row.extend(register.annotations.iter().cloned());
        t.add_row(row);
    }
    out.push_str(&format!("{t}\n"));
    out.push_str(&accounted_line("registers", &step.accounted.registers));
    out.push('\n');
    out
}

/// Renders the cross-step ranking of one (configuration, package).
pub fn render_composite(composite: &CompositeTable, name_column: &str, columns: &[String]) -> String {
    let mut header = vec![
        "STEP".to_string(),
        name_column.to_string(),
        "WEIGHTED".to_string(),
        "WEIGHTED_LAST_WW".to_string(),
    ];
    header.extend(columns.iter().cloned());

    let mut t = table(header);
    for row in &composite.rows {
        let mut cells = vec![
            row.step.to_string(),
            row.name.clone(),
            weighted(row.weighted_this_week),
            weighted(row.weighted_last_week),
        ];
        cells.extend(row.annotations.iter().cloned());
        t.add_row(cells);
    }

    let weights = composite
        .weights
        .iter()
        .map(|(step, w)| format!("{step}={:.4}", w.this_week))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "== Overall {} {} ==\n{t}\nStep weights: {weights}\n",
        composite.configuration, composite.package
    )
}

pub fn render_failure(failure: &CompositeFailure) -> String {
    format!(
        "== Overall {} {} ==\nNot built: {}\n",
        failure.configuration, failure.package, failure.error
    )
}

/// Renders every table of a run, steps first.
pub fn render_run(run: &ParetoRun) -> String {
    let name_column = match run.source {
        core_types::CompositeSource::Groups => "GROUP",
        core_types::CompositeSource::Registers => "REGISTER",
    };

    let mut out = String::new();
    for step in &run.steps {
        out.push_str(&render_step(step, &run.group_columns, &run.register_columns));
        out.push('\n');
    }
    for composite in &run.composites {
        out.push_str(&render_composite(composite, name_column, run.composite_columns()));
        out.push('\n');
    }
    for failure in &run.composite_failures {
        out.push_str(&render_failure(failure));
        out.push('\n');
    }
    out
}
