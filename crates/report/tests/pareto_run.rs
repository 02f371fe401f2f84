use composite::CompositeError;
use core_types::{CompositeSource, Configuration, Package, Step, TableKey};
use indoc::indoc;
use ingest::IngestOptions;
use pareto_engine::{ParetoContext, ParetoEngine, ParetoRun, SourceText};
use pretty_assertions::assert_eq;
use std::path::Path;

const GROUPS: &str = indoc! {"
    # shorts first so VPP_SHORT never lands in ROW
    SHORT,_SHORT
    ROW,ROW_.*
"};

const COMMENTS: &str = indoc! {"
    COMMENTS^OWNER
    SHORT^known tester issue^ann
    ROW$x8*BURN^burn-in row failures, under review^cal
"};

fn step_csv(step: Step, yield_pct: &str) -> String {
    format!(
        "REGISTER,202124,202125\n\
         {step}|X8_SDP_VPP_SHORT_REG,0.40,0.50\n\
         {step}|X8_SDP_ROW_FAIL_REG,1.00,2.00\n\
         {step}|X8_SDP_COL_FAIL_REG,nan,0.25\n\
         YIELD,96.0,{yield_pct}\n"
    )
}

fn write_inputs(dir: &Path, yields: [Option<&str>; 4]) {
    std::fs::create_dir_all(dir.join("csv_files")).unwrap();
    for (step, y) in Step::ALL.into_iter().zip(yields) {
        let key = TableKey::new(step, Configuration::X8, Package::Sdp);
        let text = match y {
            Some(y) => step_csv(step, y),
            None => step_csv(step, "").replace("YIELD,96.0,\n", ""),
        };
        std::fs::write(ingest::table_path(&dir.join("csv_files"), key), text).unwrap();
    }
    std::fs::write(dir.join("define_groups.txt"), GROUPS).unwrap();
    std::fs::write(dir.join("comments.txt"), COMMENTS).unwrap();
}

fn source(path: &Path) -> Option<SourceText> {
    std::fs::read_to_string(path)
        .ok()
        .map(|text| SourceText::new(path.display().to_string(), text))
}

fn run_in(dir: &Path) -> ParetoRun {
    let keys: Vec<TableKey> = Step::ALL
        .into_iter()
        .map(|s| TableKey::new(s, Configuration::X8, Package::Sdp))
        .collect();
    let tables = ingest::load_all(&dir.join("csv_files"), &keys, &IngestOptions::default(), |_| {}).unwrap();

    let rules: Vec<SourceText> = source(&dir.join("define_groups.txt")).into_iter().collect();
    let context = ParetoContext::load(
        &rules,
        source(&dir.join("comments.txt")).as_ref(),
        source(&dir.join("reg_comments.txt")).as_ref(),
    )
    .unwrap();

    ParetoEngine::new(&context, CompositeSource::Groups).run(&tables).unwrap()
}

#[test]
fn weekly_run_from_files() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), [Some("90.0"), Some("95.0"), Some("98.0"), Some("99.0")]);

    let run = run_in(dir.path());
    assert_eq!(run.steps.len(), 4);
    assert!(run.composite_failures.is_empty());
    assert_eq!(run.group_columns, vec!["COMMENTS", "OWNER"]);
    assert!(run.register_columns.is_empty());

    let burn = &run.steps[1];
    assert_eq!(burn.key.step, Step::Burn);
    let groups = burn.groups.as_ref().unwrap();
    assert_eq!(groups[0].group, "ROW");
    assert_eq!(groups[0].this_week, 2.0);
    assert_eq!(groups[0].annotations, vec!["burn-in row failures, under review", "cal"]);
    assert_eq!(groups[1].group, "SHORT");
    assert_eq!(groups[1].annotations, vec!["known tester issue", "ann"]);
    assert_eq!(burn.ungrouped, vec!["COL_FAIL".to_string()]);
    assert_eq!(burn.accounted.registers.this_week.to_string(), "97.75");
    assert_eq!(burn.accounted.groups.unwrap().this_week.to_string(), "97.50");

    // The ROW annotation is scoped to BURN.
    let hsrt_row = run.steps[2].groups.as_ref().unwrap().iter().find(|g| g.group == "ROW").unwrap();
    assert_eq!(hsrt_row.annotations, vec!["", ""]);

    let composite = &run.composites[0];
    let top = &composite.rows[0];
    assert_eq!((top.step, top.name.as_str()), (Step::Cfin, "ROW"));
    let burn_row = composite
        .rows
        .iter()
        .find(|r| r.step == Step::Burn && r.name == "ROW")
        .unwrap();
    assert!((burn_row.weighted_this_week - 2.0 * 0.9702).abs() < 1e-9);

    let export_dir = dir.path().join("out");
    let written = report::export_run(&export_dir, &run, true, true).unwrap();
    assert_eq!(written.len(), 4 * 3 + 1 + 1);

    let overall = std::fs::read_to_string(export_dir.join("overall_x8_SDP.csv")).unwrap();
    assert_eq!(
        overall.lines().next().unwrap(),
        "STEP,GROUP,WEIGHTED,WEIGHTED_LAST_WW,COMMENTS,OWNER"
    );
    assert_eq!(overall.lines().count(), 1 + 4 * 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(export_dir.join(report::RUN_JSON)).unwrap()).unwrap();
    assert_eq!(json["steps"][0]["key"]["step"], "PGSRT");
}

#[test]
fn missing_cfin_yield_keeps_step_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), [Some("90.0"), Some("95.0"), Some("98.0"), None]);

    let run = run_in(dir.path());
    assert_eq!(run.steps.len(), 4);
    assert!(run.composites.is_empty());
    assert_eq!(
        run.composite_failures[0].error,
        CompositeError::IncompleteYields {
            configuration: Configuration::X8,
            package: Package::Sdp,
            step: Step::Cfin,
            week: core_types::Week::ThisWeek,
        }
    );
    assert_eq!(run.steps[3].accounted.registers.this_week.to_string(), "-");
    assert_eq!(run.steps[0].groups.as_ref().unwrap().len(), 2);

    let rendered = report::render_run(&run);
    assert!(rendered.contains("Not built: Incomplete yields for x8 SDP: CFIN has no this week yield"));
}

#[test]
fn missing_definition_files_degrade_to_registers_only() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), [Some("90.0"), Some("95.0"), Some("98.0"), Some("99.0")]);
    std::fs::remove_file(dir.path().join("define_groups.txt")).unwrap();
    std::fs::remove_file(dir.path().join("comments.txt")).unwrap();

    let run = run_in(dir.path());
    assert!(run.steps.iter().all(|s| s.groups.is_none()));
    // With no groups the composite has nothing to rank, but it is still built.
    assert_eq!(run.composites.len(), 1);
    assert!(run.composites[0].rows.is_empty());
    assert_eq!(run.steps[0].registers[0].register, "ROW_FAIL");
}
