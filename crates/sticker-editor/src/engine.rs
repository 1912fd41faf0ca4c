//! Rendering engine seam
//!
//! The session owns exactly one engine, passed in at open time. Nothing
//! about the drawing technology leaks past this trait.

use crate::scene::{SceneObject, SceneSnapshot};
use crate::types::Result;

pub trait RenderingEngine {
    /// Redraw the whole scene, bottom of the z-order first
    fn render(&mut self, objects: &[SceneObject], background: &str);

    /// Flatten a guide-free snapshot to an image at `multiplier` × display
    /// resolution, returned as a `data:` URL.
    fn export_raster(&mut self, snapshot: &SceneSnapshot, multiplier: f64) -> Result<String>;

    /// Release engine resources. Called once on session teardown.
    fn dispose(&mut self);
}

/// Engine with no output, for tests and headless tools
#[derive(Debug, Default, Clone)]
pub struct HeadlessEngine {
    pub render_count: usize,
    pub last_render: Vec<SceneObject>,
    pub last_export: Option<SceneSnapshot>,
    pub last_multiplier: Option<f64>,
    pub disposed: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderingEngine for HeadlessEngine {
    fn render(&mut self, objects: &[SceneObject], _background: &str) {
        self.render_count += 1;
        self.last_render = objects.to_vec();
    }

    fn export_raster(&mut self, snapshot: &SceneSnapshot, multiplier: f64) -> Result<String> {
        self.last_export = Some(snapshot.clone());
        self.last_multiplier = Some(multiplier);
        Ok("data:image/png;base64,".to_string())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
