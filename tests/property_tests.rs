//! Property-based tests for recbench
//!
//! - CSV files grow by exactly one row per write, header once
//! - Folder creation is idempotent for any name set
//! - Run configurations never leak into the defaults
//! - Run with ProptestConfig::with_cases(64)

use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;
use recbench::config::CHECKPOINT_DIR_KEY;
use recbench::experiment::{ExperimentIdentity, RunConfig};
use recbench::layout::create_folders;
use recbench::results::{render_value, write_record, Record};
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

/// Folder-safe names (no separators, no dot-only names)
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_-]{0,11}"
}

/// Values as metrics/params would hold them
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// N records sharing one schema of `width` columns
fn arb_records() -> impl Strategy<Value = (Vec<String>, Vec<Vec<Value>>)> {
    proptest::collection::btree_set(arb_name(), 1..6).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        let width = keys.len();
        (
            Just(keys),
            proptest::collection::vec(proptest::collection::vec(arb_value(), width), 1..8),
        )
    })
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: N writes of one schema give 1 header + N rows, values in order
    #[test]
    fn prop_csv_rows_match_writes((keys, rows) in arb_records()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        for values in &rows {
            let record: Record = keys.iter().cloned().zip(values.iter().cloned()).collect();
            write_record(&path, &record).unwrap();
        }

        let written = read_rows(&path);
        prop_assert_eq!(written.len(), rows.len() + 1);
        prop_assert_eq!(&written[0], &keys);
        for (line, values) in written[1..].iter().zip(&rows) {
            let expected: Vec<String> = values.iter().map(render_value).collect();
            prop_assert_eq!(line, &expected);
        }
    }

    /// Property: every root/dataset/model directory exists, and a second
    /// call changes nothing
    #[test]
    fn prop_create_folders_idempotent(
        datasets in proptest::collection::btree_set(arb_name(), 0..4),
        models in proptest::collection::btree_set(arb_name(), 0..4),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let roots = [dir.path().join("results"), dir.path().join("saved")];
        let datasets: Vec<String> = datasets.into_iter().collect();
        let models: Vec<String> = models.into_iter().collect();

        create_folders(&datasets, &models, &roots).unwrap();
        let before: Vec<_> = roots.iter().map(|r| walk(r)).collect();
        create_folders(&datasets, &models, &roots).unwrap();
        let after: Vec<_> = roots.iter().map(|r| walk(r)).collect();

        prop_assert_eq!(before, after);
        for root in &roots {
            for dataset in &datasets {
                prop_assert!(root.join(dataset).is_dir());
                for model in &models {
                    prop_assert!(root.join(dataset).join(model).is_dir());
                }
            }
        }
    }

    /// Property: deriving a run never changes the defaults and always
    /// points at root/dataset/model
    #[test]
    fn prop_run_config_isolated(dataset in arb_name(), model in arb_name(), epochs in 1u32..500) {
        let mut defaults = Record::new();
        defaults.insert("epochs".into(), epochs.into());
        defaults.insert(CHECKPOINT_DIR_KEY.into(), "saved".into());
        let snapshot = defaults.clone();

        let config = RunConfig::for_run(
            &defaults,
            &ExperimentIdentity::new(dataset.clone(), model.clone()),
            Path::new("saved"),
        );

        prop_assert_eq!(&defaults, &snapshot);
        prop_assert_eq!(config.checkpoint_dir(), Path::new("saved").join(&dataset).join(&model));
        prop_assert_eq!(config.get("epochs"), Some(&Value::from(epochs)));
    }
}

fn walk(root: &Path) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    if let Ok(entries) = std::fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            seen.insert(path.display().to_string());
            if path.is_dir() {
                seen.extend(walk(&path));
            }
        }
    }
    seen
}
