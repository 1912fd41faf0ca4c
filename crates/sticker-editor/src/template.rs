//! Template application
//!
//! A template replaces the whole scene content in one undoable step while
//! the guides survive untouched. The payload is parsed and validated in full
//! before the scene is touched, so a bad template leaves the scene exactly
//! as it was.

use crate::guides;
use crate::history::History;
use crate::print_spec::PrintSpecification;
use crate::scene::{GuidePolicy, Scene, SceneSnapshot};
use crate::transform::ViewportFit;
use crate::types::{EditorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored template record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Snapshot as an object, or the same object encoded as a string
    pub canvas_json: Value,
}

impl Template {
    pub fn payload(&self) -> Result<TemplatePayload> {
        TemplatePayload::from_value(self.canvas_json.clone())
    }
}

/// A fully validated template snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePayload {
    snapshot: SceneSnapshot,
    /// Whether the template names a background of its own
    sets_background: bool,
}

impl TemplatePayload {
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EditorError::MalformedTemplate(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Unlike stored designs, a template must carry an `objects` array.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::String(inner) => serde_json::from_str(&inner).map_err(|e| {
                EditorError::MalformedTemplate(format!("invalid embedded JSON: {e}"))
            })?,
            other => other,
        };
        match value.get("objects") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(EditorError::MalformedTemplate(
                    "`objects` is not an array".to_string(),
                ));
            }
            None => {
                return Err(EditorError::MalformedTemplate(
                    "template has no `objects`".to_string(),
                ));
            }
        }
        let sets_background = value.get("background").is_some_and(|b| !b.is_null());
        let snapshot = SceneSnapshot::from_value(value).map_err(|e| match e {
            EditorError::MalformedSnapshot(message) => EditorError::MalformedTemplate(message),
            other => other,
        })?;
        Ok(Self {
            snapshot,
            sets_background,
        })
    }

    pub fn snapshot(&self) -> &SceneSnapshot {
        &self.snapshot
    }

    /// Background to apply, if the template names one
    pub fn background(&self) -> Option<&str> {
        self.sets_background
            .then_some(self.snapshot.background.as_str())
    }
}

/// What a template application did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub inserted: usize,
    /// Guide objects found in the template and discarded
    pub dropped_guides: usize,
}

/// Replace the scene's content with a template.
///
/// Records one history entry, keeps the current guides (and die-cut outline)
/// exactly as they were, drops any guide objects the template itself
/// carries, and rescales template content recorded at another canvas size.
/// The scene keeps its background unless the template names one.
pub fn apply_template(
    scene: &mut Scene,
    history: &mut History,
    payload: &TemplatePayload,
    spec: &PrintSpecification,
    fit: &ViewportFit,
) -> ApplyReport {
    let canvas = (fit.display_width_px, fit.display_height_px);
    history.checkpoint(scene.to_snapshot(GuidePolicy::Exclude, Some(canvas)));

    let geometry = guides::capture(scene);
    scene.clear();
    guides::install_from_geometry(scene, &geometry, spec, fit);

    let template = payload.snapshot();
    let dropped_guides = template.objects.len() - template.without_overlays().objects.len();
    if dropped_guides > 0 {
        log::warn!(
            "Template carried {} guide object(s); discarded in favour of the live guides",
            dropped_guides
        );
    }

    let content = template
        .without_overlays()
        .rescaled_to(spec, canvas.0, canvas.1);
    let inserted = content.objects.len();
    for object in content.objects {
        scene.add(object);
    }
    if let Some(background) = payload.background() {
        scene.set_background(background);
    }
    guides::pin(scene);

    log::debug!("Applied template: {} object(s)", inserted);
    ApplyReport {
        inserted,
        dropped_guides,
    }
}
