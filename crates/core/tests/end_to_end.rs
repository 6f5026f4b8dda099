//! End-to-end runs over scratch case directories
//!
//! Each test builds a small case tree on disk, runs the full pipeline and
//! checks the emitted report.

use approx::assert_relative_eq;
use foam_post_core::{
    run, ConfigFile, Execution, PhysicalConstants, PostConfig, PostError, ReportEmitter,
    ReportFormat, RunStatus,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a field file holding `values` in the solver's list layout
fn write_field(case: &Path, time: &str, values: &[f64]) {
    let dir = case.join(time);
    fs::create_dir_all(&dir).unwrap();
    let mut body = String::from("FoamFile\n{\n    object wallHeatTransferCoeff;\n}\n");
    body.push_str(&format!("{}\n(\n", values.len()));
    for v in values {
        body.push_str(&format!("{v}\n"));
    }
    body.push_str(")\n;\n");
    fs::write(dir.join("wallHeatTransferCoeff"), body).unwrap();
}

/// Case with `0 1 2 10`, field only in `1` and `10`
fn sparse_case() -> TempDir {
    let case = tempfile::tempdir().unwrap();
    for time in ["0", "2"] {
        fs::create_dir(case.path().join(time)).unwrap();
    }
    write_field(case.path(), "1", &[5.0]);
    write_field(case.path(), "10", &[10.0, 10.0]);
    fs::create_dir(case.path().join("constant")).unwrap();
    case
}

fn config(case: &Path) -> PostConfig {
    PostConfig::new(PhysicalConstants::new(0.5, 0.025).unwrap()).with_case_root(case)
}

#[test]
fn test_sparse_case_two_rows_in_time_order() {
    let case = sparse_case();
    let summary = run(&config(case.path())).unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.snapshots_seen, 4);
    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records[0].label, "1");
    assert_eq!(summary.records[1].label, "10");
    assert_relative_eq!(*summary.records[0].mean_h, 5.0);
    assert_relative_eq!(*summary.records[1].mean_h, 10.0);
    assert_relative_eq!(summary.records[0].nusselt, 100.0, epsilon = 1e-9);
    assert_relative_eq!(summary.records[1].nusselt, 200.0, epsilon = 1e-9);
    assert_eq!(summary.skipped.absent, 2);

    let report = ReportEmitter::new(ReportFormat::Table).render(&summary).unwrap();
    let rows: Vec<&str> = report
        .lines()
        .filter(|line| line.contains(" | ") && !line.starts_with("Time"))
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("1 "));
    assert!(rows[0].contains("5.0000"));
    assert!(rows[1].starts_with("10 "));
    assert!(rows[1].contains("10.0000"));
}

#[test]
fn test_parallel_matches_sequential() {
    let case = tempfile::tempdir().unwrap();
    for i in 0..40 {
        let time = format!("{}", f64::from(i) * 0.25);
        if i % 3 == 0 {
            fs::create_dir(case.path().join(&time)).unwrap();
        } else {
            write_field(case.path(), &time, &[f64::from(i), f64::from(i) + 1.0]);
        }
    }

    let sequential = run(&config(case.path())).unwrap();
    let parallel =
        run(&config(case.path()).with_execution(Execution::Parallel { threads: 4 })).unwrap();

    assert_eq!(sequential.records, parallel.records);
    assert_eq!(sequential.skipped, parallel.skipped);
    assert!(sequential
        .records
        .windows(2)
        .all(|pair| pair[0].time < pair[1].time));
}

#[test]
fn test_no_time_directories_gives_empty_report() {
    let case = tempfile::tempdir().unwrap();
    fs::create_dir(case.path().join("constant")).unwrap();
    fs::create_dir(case.path().join("system")).unwrap();

    let summary = run(&config(case.path())).unwrap();
    assert_eq!(summary.status, RunStatus::NoSnapshots);

    let csv = ReportEmitter::new(ReportFormat::Csv).render(&summary).unwrap();
    assert_eq!(csv, "time,mean_h,nusselt\n");
}

#[test]
fn test_unreadable_case_root_aborts() {
    let case = tempfile::tempdir().unwrap();
    let err = run(&config(&case.path().join("missing"))).unwrap_err();
    assert!(matches!(err, PostError::Configuration { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_malformed_snapshot_does_not_halt_run() {
    let case = sparse_case();
    fs::create_dir(case.path().join("5")).unwrap();
    fs::write(
        case.path().join("5").join("wallHeatTransferCoeff"),
        "(\nnot-a-number\n)\n",
    )
    .unwrap();

    let summary = run(&config(case.path())).unwrap();
    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.skipped.degenerate, 1);
}

#[test]
fn test_unreadable_field_file_is_counted_as_failed() {
    let case = sparse_case();
    // A directory where the field file should be opens but cannot be read
    fs::create_dir_all(case.path().join("4").join("wallHeatTransferCoeff")).unwrap();

    let summary = run(&config(case.path())).unwrap();
    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.snapshots_seen, 5);
    assert_eq!(summary.skipped.failed, 1);
    assert_eq!(summary.skipped.absent, 2);
    assert_eq!(summary.records.len(), 2);
}

#[test]
fn test_custom_field_name_from_config_file() {
    let case = tempfile::tempdir().unwrap();
    let dir = case.path().join("3");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("heatTransferCoeff"), "(\n2\n4\n)\n").unwrap();

    let config_path = case.path().join("post.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"case_root": {:?}, "characteristic_length": 1.0, "thermal_conductivity": 0.5, "field_name": "heatTransferCoeff"}}"#,
            case.path().to_string_lossy()
        ),
    )
    .unwrap();

    let config = ConfigFile::load(&config_path).unwrap().into_config().unwrap();
    let summary = run(&config).unwrap();

    assert_eq!(summary.records.len(), 1);
    assert_relative_eq!(*summary.records[0].mean_h, 3.0);
    assert_relative_eq!(summary.records[0].nusselt, 6.0);
}
