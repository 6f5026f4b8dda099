//! Time-series aggregation driver
//!
//! INIT → DISCOVER → per snapshot (LOAD → PARSE → AGGREGATE or SKIP) → REPORT
//!
//! Only configuration-level failures abort the run. Every per-snapshot
//! condition is absorbed into a [`SnapshotOutcome`] and counted.

use crate::aggregate::{aggregate, AggregateRecord, PhysicalConstants};
use crate::config::{Execution, PostConfig};
use crate::error::PostError;
use crate::field_file::read_field_file;
use crate::snapshot::{discover_snapshots, Snapshot};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    /// Field read and reduced
    Recorded(AggregateRecord),
    /// Field file not written for this time
    FieldAbsent,
    /// Field file present but without a single parsable value
    Degenerate,
    /// Field file present but unusable (I/O error, bad encoding)
    Failed(String),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All discovered snapshots were processed
    Completed,
    /// The case root holds no time directory
    NoSnapshots,
}

/// Per-reason tally of snapshots without a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub absent: usize,
    pub degenerate: usize,
    pub failed: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.absent + self.degenerate + self.failed
    }
}

/// Result of one aggregation run, records in ascending time order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub case_root: PathBuf,
    pub field_name: String,
    pub constants: PhysicalConstants,
    pub status: RunStatus,
    pub snapshots_seen: usize,
    pub skipped: SkipCounts,
    pub records: Vec<AggregateRecord>,
}

/// Load, parse and reduce one snapshot.
pub fn process_snapshot(
    snapshot: &Snapshot,
    field_name: &str,
    constants: &PhysicalConstants,
) -> SnapshotOutcome {
    let values = match read_field_file(&snapshot.path, field_name) {
        Ok(Some(values)) => values,
        Ok(None) => {
            debug!("t={}: no '{}' file, skipping", snapshot.label, field_name);
            return SnapshotOutcome::FieldAbsent;
        }
        Err(e) => {
            warn!("t={}: {}", snapshot.label, e);
            return SnapshotOutcome::Failed(e.to_string());
        }
    };

    match aggregate(snapshot, &values, constants) {
        Ok(record) => {
            debug!(
                "t={}: {} values, mean h={:.4}, Nu={:.2}",
                snapshot.label,
                values.len(),
                *record.mean_h,
                record.nusselt
            );
            SnapshotOutcome::Recorded(record)
        }
        Err(PostError::InvalidInput(_)) => {
            debug!("t={}: '{}' holds no values, skipping", snapshot.label, field_name);
            SnapshotOutcome::Degenerate
        }
        Err(e) => {
            warn!("t={}: {}", snapshot.label, e);
            SnapshotOutcome::Failed(e.to_string())
        }
    }
}

fn process_all(
    snapshots: &[Snapshot],
    config: &PostConfig,
) -> Result<Vec<SnapshotOutcome>, PostError> {
    let work = |snapshot: &Snapshot| process_snapshot(snapshot, &config.field_name, &config.constants);

    match config.execution {
        Execution::Sequential => Ok(snapshots.iter().map(work).collect()),
        Execution::Parallel { threads } => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    PostError::configuration(
                        &config.case_root,
                        format!("failed to start {threads} worker threads: {e}"),
                    )
                })?;
            debug!("Processing snapshots on {} workers", pool.current_num_threads());
            Ok(pool.install(|| snapshots.par_iter().map(work).collect()))
        }
    }
}

/// Run the aggregation pipeline described by `config`.
///
/// # Errors
/// Returns [`PostError::InvalidConstant`] for out-of-range constants and
/// [`PostError::Configuration`] if the case root cannot be listed or the
/// worker pool cannot start. Per-snapshot problems never surface here.
pub fn run(config: &PostConfig) -> Result<RunSummary, PostError> {
    let started = Instant::now();
    let constants = config.constants.validated()?;

    info!(
        "Aggregating '{}' under {} (L={}, k={})",
        config.field_name,
        config.case_root.display(),
        constants.characteristic_length,
        constants.thermal_conductivity
    );

    let snapshots = discover_snapshots(&config.case_root)?;
    let mut summary = RunSummary {
        case_root: config.case_root.clone(),
        field_name: config.field_name.clone(),
        constants,
        status: RunStatus::Completed,
        snapshots_seen: snapshots.len(),
        skipped: SkipCounts::default(),
        records: Vec::new(),
    };

    if snapshots.is_empty() {
        warn!("No time directories found in {}", config.case_root.display());
        summary.status = RunStatus::NoSnapshots;
        return Ok(summary);
    }

    for outcome in process_all(&snapshots, config)? {
        match outcome {
            SnapshotOutcome::Recorded(record) => summary.records.push(record),
            SnapshotOutcome::FieldAbsent => summary.skipped.absent += 1,
            SnapshotOutcome::Degenerate => summary.skipped.degenerate += 1,
            SnapshotOutcome::Failed(_) => summary.skipped.failed += 1,
        }
    }

    // Worker completion order is unspecified
    summary.records.sort_by(|a, b| {
        a.time
            .total_cmp(&b.time)
            .then_with(|| a.label.cmp(&b.label))
    });

    info!(
        "Processed {} snapshots: {} records, {} skipped in {:.1} ms",
        summary.snapshots_seen,
        summary.records.len(),
        summary.skipped.total(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(summary)
}
