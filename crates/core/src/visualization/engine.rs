//! Render engine trait definition
//!
//! The engine is an external collaborator (a `ParaView` session, a batch script
//! generator, a headless renderer). The driver treats every call as
//! independent; it never inspects engine state.

use super::{Bounds, CameraSpec, DerivedField, ImageSettings, SliceSpec};
use crate::error::PostError;
use std::path::Path;

/// Backend-agnostic interface for slice rendering
pub trait RenderEngine {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Spatial extent of the loaded case, if the engine can tell.
    fn bounds(&self) -> Option<Bounds>;

    /// Whether the engine can place [`super::Anchor::MeshSliceOrigin`] itself,
    /// without the bounds being known here.
    fn resolves_mesh_anchor(&self) -> bool {
        false
    }

    /// Load the volumetric fields written at `time`.
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if the engine cannot load the time.
    fn load_time(&mut self, time: f64) -> Result<(), PostError>;

    /// Cut a planar slice and colour it by a derived scalar field.
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if the pipeline objects cannot be built.
    fn show_slice(&mut self, slice: &SliceSpec, field: &DerivedField) -> Result<(), PostError>;

    /// Position the camera for the current view.
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if there is no view to frame.
    fn set_camera(&mut self, camera: &CameraSpec) -> Result<(), PostError>;

    /// Export the current view as a raster image.
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if the image cannot be written.
    fn save_image(&mut self, path: &Path, image: ImageSettings) -> Result<(), PostError>;

    /// Release the objects created by [`RenderEngine::show_slice`].
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if the objects cannot be released.
    fn clear_view(&mut self) -> Result<(), PostError>;
}
