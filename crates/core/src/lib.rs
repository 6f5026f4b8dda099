//! CFD Post-Processing Core Library
//!
//! Reads the time directories an `OpenFOAM` run leaves behind and turns them into
//! a Nusselt-number time series, plus slice images through an external
//! renderer.
//!
//! ## Pipeline
//!
//! - [`snapshot`]: numeric time directories, sorted by time value
//! - [`field_file`]: tolerant reader for boundary scalar lists
//! - [`aggregate`]: face mean and Nu = h̄·L/k
//! - [`report`]: table, CSV or JSON output
//! - [`pipeline`]: the run driver tying these together
//! - [`visualization`]: per-snapshot slice rendering via a [`RenderEngine`]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod field_file;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod units;
pub mod visualization;

pub use aggregate::{aggregate, mean, nusselt_number, AggregateRecord, PhysicalConstants};
pub use config::{ConfigFile, Execution, PostConfig};
pub use error::PostError;
pub use field_file::{parse_scalar_list, read_field_file, DEFAULT_FIELD_NAME};
pub use pipeline::{process_snapshot, run, RunStatus, RunSummary, SkipCounts, SnapshotOutcome};
pub use report::{ReportEmitter, ReportFormat};
pub use snapshot::{discover_snapshots, is_time_directory_name, Snapshot};
pub use visualization::{
    Anchor, Bounds, CameraSpec, ImageSettings, PvScriptEngine, RenderEngine, SliceSpec,
    VisualizationDriver,
};
