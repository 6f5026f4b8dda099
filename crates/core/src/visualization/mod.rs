//! Slice rendering of volumetric fields per snapshot
//!
//! For every snapshot the driver loads the time, cuts one plane through the
//! domain and exports one image per view:
//!
//! - `U_slice_t_<time>.png`: velocity magnitude `mag(U)`
//! - `T_slice_t_<time>.png`: temperature `T`
//!
//! The actual rendering is delegated to a [`RenderEngine`].

pub mod engine;
pub mod pvscript;

pub use engine::RenderEngine;
pub use pvscript::PvScriptEngine;

use crate::error::PostError;
use crate::snapshot::Snapshot;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Axis-aligned extent of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Bounds {
    /// Build from `[xmin, xmax, ymin, ymax, zmin, zmax]`, the order VTK reports.
    pub fn from_extents(extents: [f64; 6]) -> Self {
        Self {
            min: Vector3::new(extents[0], extents[2], extents[4]),
            max: Vector3::new(extents[1], extents[3], extents[5]),
        }
    }

    /// Default slice origin: mid-plane in x and y, low in z.
    pub fn slice_origin(&self) -> Vector3<f64> {
        Vector3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.1 * (self.min.z + self.max.z),
        )
    }
}

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|e| format!("invalid bound '{}': {e}", part.trim()))
            })
            .collect::<Result<Vec<f64>, String>>()?;
        let extents: [f64; 6] = values.try_into().map_err(|v: Vec<f64>| {
            format!("expected 6 comma-separated bounds (xmin,xmax,ymin,ymax,zmin,zmax), got {}", v.len())
        })?;
        if extents.chunks(2).any(|pair| pair[0] > pair[1]) {
            return Err("each minimum must not exceed its maximum".to_string());
        }
        Ok(Self::from_extents(extents))
    }
}

/// A point in the domain, either known up front or read from the mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Fixed coordinates
    At(Vector3<f64>),
    /// [`Bounds::slice_origin`] of the mesh, resolved by the engine when it loads the case
    MeshSliceOrigin,
}

/// Cutting plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSpec {
    pub origin: Anchor,
    pub normal: Vector3<f64>,
}

impl SliceSpec {
    /// Plane normal to x through the default origin of `bounds`.
    pub fn through(bounds: &Bounds) -> Self {
        Self {
            origin: Anchor::At(bounds.slice_origin()),
            normal: Vector3::x(),
        }
    }

    /// Plane normal to x through the default origin of whatever mesh the
    /// engine has loaded.
    pub fn through_mesh() -> Self {
        Self {
            origin: Anchor::MeshSliceOrigin,
            normal: Vector3::x(),
        }
    }
}

/// Scalar computed on the slice and used for colouring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedField {
    /// Name of the result array
    pub name: String,
    /// Calculator expression over the loaded arrays
    pub expression: String,
}

impl DerivedField {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Camera placement for one view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraSpec {
    /// Let the engine frame the visible data
    ResetToFit,
    /// Explicit placement, optionally followed by a fit
    Placed {
        position: Vector3<f64>,
        focal_point: Anchor,
        view_up: Vector3<f64>,
        reset_after: bool,
    },
}

/// One image produced per snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    /// File name prefix, e.g. `U` gives `U_slice_t_<time>.png`
    pub prefix: String,
    pub field: DerivedField,
    pub camera: CameraSpec,
}

impl ViewSpec {
    /// Velocity magnitude, camera fitted to the slice.
    pub fn velocity_magnitude() -> Self {
        Self {
            prefix: "U".to_string(),
            field: DerivedField::new("U_mag", "mag(U)"),
            camera: CameraSpec::ResetToFit,
        }
    }

    /// Temperature, camera looking down -x at `focal_point`, then fitted.
    pub fn temperature(focal_point: Anchor) -> Self {
        Self {
            prefix: "T".to_string(),
            field: DerivedField::new("T_copy", "T"),
            camera: CameraSpec::Placed {
                position: Vector3::new(2.0, 0.0, 0.0),
                focal_point,
                view_up: Vector3::y(),
                reset_after: true,
            },
        }
    }

    /// Image file name for a snapshot.
    pub fn file_name(&self, snapshot: &Snapshot) -> String {
        format!("{}_slice_t_{}.png", self.prefix, snapshot.label)
    }
}

/// Raster export resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Drives a [`RenderEngine`] over a sequence of snapshots
#[derive(Debug, Clone)]
pub struct VisualizationDriver {
    output_dir: PathBuf,
    image: ImageSettings,
    slice: Option<SliceSpec>,
}

impl VisualizationDriver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            image: ImageSettings::default(),
            slice: None,
        }
    }

    pub fn with_image(mut self, image: ImageSettings) -> Self {
        self.image = image;
        self
    }

    /// Use a fixed plane instead of one derived from the bounds.
    pub fn with_slice(mut self, slice: SliceSpec) -> Self {
        self.slice = Some(slice);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Views rendered for every snapshot, in order.
    pub fn views(slice: &SliceSpec) -> Vec<ViewSpec> {
        vec![
            ViewSpec::velocity_magnitude(),
            ViewSpec::temperature(slice.origin),
        ]
    }

    fn resolve_slice<E: RenderEngine>(
        &self,
        engine: &E,
        bounds: Option<Bounds>,
    ) -> Result<SliceSpec, PostError> {
        if let Some(slice) = self.slice {
            return Ok(slice);
        }
        if let Some(bounds) = bounds.or_else(|| engine.bounds()) {
            return Ok(SliceSpec::through(&bounds));
        }
        if engine.resolves_mesh_anchor() {
            return Ok(SliceSpec::through_mesh());
        }
        Err(PostError::Render(format!(
            "engine '{}' cannot report case bounds; supply them explicitly",
            engine.name()
        )))
    }

    /// Render every view of every snapshot, in snapshot order.
    ///
    /// Returns the image paths in the order they were requested.
    ///
    /// # Errors
    /// Returns [`PostError::Configuration`] if the output directory cannot be
    /// created and [`PostError::Render`] if the slice cannot be placed or the
    /// engine fails.
    pub fn render_all<E: RenderEngine>(
        &self,
        engine: &mut E,
        snapshots: &[Snapshot],
        bounds: Option<Bounds>,
    ) -> Result<Vec<PathBuf>, PostError> {
        let slice = self.resolve_slice(engine, bounds)?;
        let views = Self::views(&slice);

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| PostError::configuration(&self.output_dir, e.to_string()))?;

        info!(
            "Rendering {} snapshots with {} (slice origin {:?})",
            snapshots.len(),
            engine.name(),
            slice.origin
        );

        let mut images = Vec::with_capacity(snapshots.len() * views.len());
        for snapshot in snapshots {
            debug!("Rendering t={}", snapshot.label);
            engine.load_time(snapshot.time)?;

            for view in &views {
                let path = self.output_dir.join(view.file_name(snapshot));
                engine.show_slice(&slice, &view.field)?;
                engine.set_camera(&view.camera)?;
                engine.save_image(&path, self.image)?;
                engine.clear_view()?;
                images.push(path);
            }
        }

        info!("Saved {} images to {}", images.len(), self.output_dir.display());
        Ok(images)
    }
}
