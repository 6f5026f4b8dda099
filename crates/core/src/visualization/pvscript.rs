//! `ParaView` batch-script backend
//!
//! Instead of linking a renderer, this engine records every request as a
//! `paraview.simple` statement. The resulting script is run with
//! `pvbatch script.py` next to the case's `.foam` file.

use super::{Anchor, Bounds, CameraSpec, DerivedField, ImageSettings, RenderEngine, SliceSpec};
use crate::error::PostError;
use nalgebra::Vector3;
use std::fs;
use std::path::{Path, PathBuf};

/// Cell arrays requested from the reader
const CELL_ARRAYS: [&str; 5] = ["U", "T", "p", "p_rgh", "rho"];

/// Quote `s` as a Python string literal.
fn py_str(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn py_vec(v: &Vector3<f64>) -> String {
    format!("[{:?}, {:?}, {:?}]", v.x, v.y, v.z)
}

fn py_anchor(anchor: &Anchor) -> String {
    match anchor {
        Anchor::At(point) => py_vec(point),
        Anchor::MeshSliceOrigin => "[xmid, ymid, zmid]".to_string(),
    }
}

/// Script-generating [`RenderEngine`]
#[derive(Debug, Clone)]
pub struct PvScriptEngine {
    case_file: PathBuf,
    bounds: Option<Bounds>,
    view_size: ImageSettings,
    script: String,
    view_open: bool,
}

impl PvScriptEngine {
    /// Start a script that opens `case_file` (usually `<case>/case.foam`).
    pub fn new(case_file: impl Into<PathBuf>, view_size: ImageSettings) -> Self {
        let mut engine = Self {
            case_file: case_file.into(),
            bounds: None,
            view_size,
            script: String::new(),
            view_open: false,
        };
        engine.write_preamble();
        engine
    }

    /// Fixed bounds overriding the ones the script reads from the mesh.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Script text produced so far.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Write the script to `path`.
    ///
    /// # Errors
    /// Returns [`PostError::Render`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), PostError> {
        fs::write(path, &self.script)
            .map_err(|e| PostError::Render(format!("failed to write {}: {e}", path.display())))
    }

    fn line(&mut self, text: &str) {
        self.script.push_str(text);
        self.script.push('\n');
    }

    fn write_preamble(&mut self) {
        let arrays = CELL_ARRAYS
            .iter()
            .map(|a| format!("'{a}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let case_file = py_str(&self.case_file.to_string_lossy());
        let (width, height) = (self.view_size.width, self.view_size.height);

        self.line("from paraview.simple import *");
        self.line("");
        self.line("paraview.simple._DisableFirstRenderCameraReset()");
        self.line("renderView = GetActiveViewOrCreate('RenderView')");
        self.line(&format!("renderView.ViewSize = [{width}, {height}]"));
        self.line(&format!("reader = OpenFOAMReader(FileName={case_file})"));
        self.line("reader.MeshRegions = ['internalMesh']");
        self.line(&format!("reader.CellArrays = [{arrays}]"));
        self.line("reader.UpdatePipeline()");
        self.line("");
        self.line("bounds = reader.GetDataInformation().GetBounds()");
        self.line("xmid = 0.5 * (bounds[0] + bounds[1])");
        self.line("ymid = 0.5 * (bounds[2] + bounds[3])");
        self.line("zmid = 0.1 * (bounds[4] + bounds[5])");
    }
}

impl RenderEngine for PvScriptEngine {
    fn name(&self) -> &str {
        "pvbatch script"
    }

    fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn resolves_mesh_anchor(&self) -> bool {
        true
    }

    fn load_time(&mut self, time: f64) -> Result<(), PostError> {
        self.line("");
        self.line(&format!("reader.UpdatePipeline(time={time:?})"));
        Ok(())
    }

    fn show_slice(&mut self, slice: &SliceSpec, field: &DerivedField) -> Result<(), PostError> {
        if self.view_open {
            return Err(PostError::Render(
                "previous view was not cleared".to_string(),
            ));
        }
        let name = py_str(&field.name);
        self.line("slice_ = Slice(Input=reader)");
        self.line("slice_.SliceType = 'Plane'");
        self.line(&format!("slice_.SliceType.Origin = {}", py_anchor(&slice.origin)));
        self.line(&format!("slice_.SliceType.Normal = {}", py_vec(&slice.normal)));
        self.line("calc = Calculator(Input=slice_)");
        self.line(&format!("calc.ResultArrayName = {name}"));
        self.line(&format!("calc.Function = {}", py_str(&field.expression)));
        self.line("display = Show(calc, renderView)");
        self.line(&format!("ColorBy(display, ('POINTS', {name}))"));
        self.line("display.RescaleTransferFunctionToDataRange(True)");
        self.view_open = true;
        Ok(())
    }

    fn set_camera(&mut self, camera: &CameraSpec) -> Result<(), PostError> {
        if !self.view_open {
            return Err(PostError::Render("no view to frame".to_string()));
        }
        match camera {
            CameraSpec::ResetToFit => self.line("renderView.ResetCamera()"),
            CameraSpec::Placed {
                position,
                focal_point,
                view_up,
                reset_after,
            } => {
                self.line(&format!("renderView.CameraPosition = {}", py_vec(position)));
                self.line(&format!("renderView.CameraFocalPoint = {}", py_anchor(focal_point)));
                self.line(&format!("renderView.CameraViewUp = {}", py_vec(view_up)));
                if *reset_after {
                    self.line("renderView.ResetCamera()");
                }
            }
        }
        self.line("renderView.Update()");
        Ok(())
    }

    fn save_image(&mut self, path: &Path, image: ImageSettings) -> Result<(), PostError> {
        if !self.view_open {
            return Err(PostError::Render(format!(
                "nothing to save for {}",
                path.display()
            )));
        }
        self.line(&format!(
            "SaveScreenshot({}, renderView, ImageResolution=[{}, {}])",
            py_str(&path.to_string_lossy()),
            image.width,
            image.height
        ));
        Ok(())
    }

    fn clear_view(&mut self) -> Result<(), PostError> {
        if self.view_open {
            self.line("Delete(display)");
            self.line("Delete(calc)");
            self.line("Delete(slice_)");
            self.view_open = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use crate::visualization::VisualizationDriver;

    fn engine() -> PvScriptEngine {
        PvScriptEngine::new("case/case.foam", ImageSettings::default())
            .with_bounds(Bounds::from_extents([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]))
    }

    #[test]
    fn test_python_string_quoting() {
        assert_eq!(py_str("plain"), "\"plain\"");
        assert_eq!(py_str(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_preamble_opens_reader() {
        let engine = engine();
        let script = engine.script();
        assert!(script.starts_with("from paraview.simple import *\n"));
        assert!(script.contains("renderView.ViewSize = [1920, 1080]"));
        assert!(script.contains("reader = OpenFOAMReader(FileName=\"case/case.foam\")"));
        assert!(script.contains("reader.CellArrays = ['U', 'T', 'p', 'p_rgh', 'rho']"));
    }

    #[test]
    fn test_driver_generates_one_block_per_view() {
        let out = tempfile::tempdir().unwrap();
        let mut engine = engine();
        let snapshots = [Snapshot {
            label: "2".to_string(),
            time: 2.0,
            path: PathBuf::from("case/2"),
        }];

        VisualizationDriver::new(out.path())
            .render_all(&mut engine, &snapshots, None)
            .unwrap();

        let script = engine.script();
        assert!(script.contains("reader.UpdatePipeline(time=2.0)"));
        assert!(script.contains("slice_.SliceType.Origin = [0.5, 0.5, 0.1]"));
        assert!(script.contains("slice_.SliceType.Normal = [1.0, 0.0, 0.0]"));
        assert!(script.contains("calc.Function = \"mag(U)\""));
        assert!(script.contains("ColorBy(display, ('POINTS', \"T_copy\"))"));
        assert!(script.contains("renderView.CameraPosition = [2.0, 0.0, 0.0]"));
        assert!(script.contains("U_slice_t_2.png"));
        assert!(script.contains("T_slice_t_2.png"));
        assert_eq!(script.matches("Delete(slice_)").count(), 2);
    }

    #[test]
    fn test_mesh_bounds_queried_when_none_given() {
        let out = tempfile::tempdir().unwrap();
        let mut engine = PvScriptEngine::new("case/case.foam", ImageSettings::default());
        let snapshots = [Snapshot {
            label: "0.5".to_string(),
            time: 0.5,
            path: PathBuf::from("case/0.5"),
        }];

        VisualizationDriver::new(out.path())
            .render_all(&mut engine, &snapshots, None)
            .unwrap();

        let script = engine.script();
        assert!(script.contains("bounds = reader.GetDataInformation().GetBounds()"));
        assert!(script.contains("zmid = 0.1 * (bounds[4] + bounds[5])"));
        assert_eq!(
            script.matches("slice_.SliceType.Origin = [xmid, ymid, zmid]").count(),
            2
        );
        assert!(script.contains("renderView.CameraFocalPoint = [xmid, ymid, zmid]"));
    }

    #[test]
    fn test_save_without_view_is_error() {
        let mut engine = engine();
        let err = engine
            .save_image(Path::new("x.png"), ImageSettings::default())
            .unwrap_err();
        assert!(matches!(err, PostError::Render(_)));
    }

    #[test]
    fn test_write_script_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.py");
        engine().write_to(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("OpenFOAMReader"));
    }
}
