//! End-to-end pipeline test
//!
//! Real `CommandBackend` (a shell bridge standing in for the framework) and
//! real `EnergyTracker`, driven through `dispatch` as the binary does.

#![cfg(unix)]

use std::fs;
use std::path::Path;

use recbench::backend::CommandBackend;
use recbench::cli::dispatch;
use recbench::config::Settings;
use recbench::emissions::EnergyTracker;
use recbench::experiment::ExperimentDriver;

const BRIDGE: &str = r#"
case "$1" in
  train)
    dir=$(sed -n 's/.*"checkpoint_dir":"\([^"]*\)".*/\1/p')
    [ "$3" = "Broken" ] && { echo "Traceback: model exploded" >&2; exit 1; }
    printf 'weights' > "$dir/$3-epoch1.pth"
    ;;
  inspect)
    echo '{"MODEL_TYPE": "GENERAL", "model": "Pop", "eval_batch_size": 4096}'
    ;;
  evaluate)
    echo '{"recall@10": 0.0625, "hit@10": 0.5}'
    ;;
esac
"#;

fn settings(root: &Path) -> Settings {
    let toml = format!(
        r#"
[experiments]
datasets = ["ml-100k"]
models = ["Pop", "Broken"]

[output]
log_file = {log:?}
result_path = {results:?}

[params]
checkpoint_dir = {saved:?}
epochs = 1

[trainer]
program = "sh"
args = ["-c", {bridge:?}, "bridge"]

[emissions]
cpu_power_watts = 10.0
carbon_intensity_g_per_kwh = 100.0
"#,
        log = root.join("log.txt").display().to_string(),
        results = root.join("results").display().to_string(),
        saved = root.join("saved").display().to_string(),
        bridge = BRIDGE,
    );
    Settings::parse(&toml, "pipeline.toml").unwrap()
}

fn column(path: &Path, name: &str) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let idx = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == name)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap()[idx].to_string())
        .collect()
}

#[test]
fn test_batch_correlates_rows_by_run_id() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut driver = ExperimentDriver::new(
        &settings,
        CommandBackend::new(settings.trainer.clone()),
        EnergyTracker::new(settings.emissions.clone()),
    );
    let no_args: [&str; 0] = [];

    let summary = dispatch(&settings, &no_args, &mut Vec::<u8>::new(), |id| {
        driver.process(id)
    })
    .unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.failed_projects(), ["ML-100K_BROKEN_DEFAULT_PARAM"]);

    let pop = dir.path().join("results/ml-100k/Pop");
    let run_ids = column(&pop.join("metrics.csv"), "run_id");
    assert_eq!(run_ids.len(), 1);
    assert_eq!(column(&pop.join("params.csv"), "run_id"), run_ids);
    assert_eq!(column(&pop.join("emissions.csv"), "run_id"), run_ids);
    assert_eq!(
        column(&pop.join("metrics.csv"), "project_name"),
        ["ML-100K_POP_DEFAULT_PARAM"]
    );

    let broken = dir.path().join("results/ml-100k/Broken");
    assert!(!broken.join("metrics.csv").exists());
    assert_eq!(column(&broken.join("emissions.csv"), "run_id").len(), 1);

    let log = fs::read_to_string(dir.path().join("log.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "EXECUTED: ML-100K_POP_DEFAULT_PARAM");
    assert!(lines[3].starts_with("ERROR: ML-100K_BROKEN_DEFAULT_PARAM. Backend command `train` failed"));
    assert!(lines[3].contains("model exploded"));
}
