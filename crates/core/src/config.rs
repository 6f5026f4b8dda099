//! Run configuration
//!
//! A [`PostConfig`] is built once and passed by reference into
//! [`crate::pipeline::run`]. It can come from a JSON file, from command-line
//! flags, or from both with the flags layered on top:
//!
//! ```json
//! {
//!     "case_root": "runs/heated-plate",
//!     "characteristic_length": 0.5,
//!     "thermal_conductivity": 0.025,
//!     "field_name": "wallHeatTransferCoeff",
//!     "threads": 4
//! }
//! ```

use crate::aggregate::PhysicalConstants;
use crate::error::PostError;
use crate::field_file::DEFAULT_FIELD_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How snapshots are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// One snapshot after another on the calling thread
    #[default]
    Sequential,
    /// Fixed-size worker pool; `threads == 0` uses one worker per core
    Parallel { threads: usize },
}

impl Execution {
    /// Map a thread count to a schedule. `1` (or nothing) means sequential.
    pub fn from_threads(threads: Option<usize>) -> Self {
        match threads {
            None | Some(1) => Self::Sequential,
            Some(threads) => Self::Parallel { threads },
        }
    }
}

/// Immutable configuration of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostConfig {
    /// Directory holding the time directories
    pub case_root: PathBuf,
    /// Field file read in every time directory
    pub field_name: String,
    /// Constants entering the Nusselt number
    pub constants: PhysicalConstants,
    /// Snapshot scheduling
    pub execution: Execution,
}

impl PostConfig {
    /// Configuration for the current directory and the default field.
    pub fn new(constants: PhysicalConstants) -> Self {
        Self {
            case_root: PathBuf::from("."),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            constants,
            execution: Execution::Sequential,
        }
    }

    pub fn with_case_root(mut self, case_root: impl Into<PathBuf>) -> Self {
        self.case_root = case_root.into();
        self
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}

/// Partially specified configuration, as read from a file or from flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub case_root: Option<PathBuf>,
    #[serde(default)]
    pub characteristic_length: Option<f64>,
    #[serde(default)]
    pub thermal_conductivity: Option<f64>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub threads: Option<usize>,
}

impl ConfigFile {
    /// Load a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`PostError::Configuration`] if the file cannot be read or
    /// parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PostError> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| PostError::configuration(path, e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| PostError::configuration(path, e.to_string()))
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: ConfigFile) -> Self {
        Self {
            case_root: overrides.case_root.or(self.case_root),
            characteristic_length: overrides.characteristic_length.or(self.characteristic_length),
            thermal_conductivity: overrides.thermal_conductivity.or(self.thermal_conductivity),
            field_name: overrides.field_name.or(self.field_name),
            threads: overrides.threads.or(self.threads),
        }
    }

    /// Resolve defaults and validate the constants.
    ///
    /// # Errors
    /// Returns [`PostError::Configuration`] if a required constant is missing
    /// and [`PostError::InvalidConstant`] if one is out of range.
    pub fn into_config(self) -> Result<PostConfig, PostError> {
        let case_root = self.case_root.unwrap_or_else(|| PathBuf::from("."));
        let length = self.characteristic_length.ok_or_else(|| {
            PostError::configuration(&case_root, "characteristic_length is required")
        })?;
        let conductivity = self.thermal_conductivity.ok_or_else(|| {
            PostError::configuration(&case_root, "thermal_conductivity is required")
        })?;
        let constants = PhysicalConstants::new(length, conductivity)?;

        let mut config = PostConfig::new(constants)
            .with_case_root(case_root)
            .with_execution(Execution::from_threads(self.threads));
        if let Some(field_name) = self.field_name {
            config = config.with_field_name(field_name);
        }
        Ok(config)
    }
}
