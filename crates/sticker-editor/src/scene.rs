//! Scene document model
//!
//! The live, ordered object list of one editor session and its portable JSON
//! form. Index 0 is the bottom of the z-order. Deserialization is a factory
//! over the `type` tag; unknown types and missing geometry are rejected at
//! this boundary so malformed data never reaches live state.

use crate::constants::DEFAULT_BACKGROUND;
use crate::print_spec::PrintSpecification;
use crate::types::{EditorError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Fallback font size when a text object omits one
pub const DEFAULT_FONT_SIZE: f64 = 40.0;

/// Line height multiplier applied to multi-line text
pub const TEXT_LINE_HEIGHT: f64 = 1.16;

/// Approximate advance width of one glyph relative to the font size
pub const TEXT_CHAR_WIDTH_RATIO: f64 = 0.5;

/// What an object is for. Anything other than `Content` is a non-printable
/// overlay and is never exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Content,
    BleedGuide,
    SafeGuide,
    ShapeOutline,
}

impl Role {
    pub const BLEED_GUIDE_NAME: &'static str = "bleedGuide";
    pub const SAFE_GUIDE_NAME: &'static str = "safeGuide";
    pub const SHAPE_OUTLINE_NAME: &'static str = "customShapeOutline";

    /// Map a wire `name` onto a role. Any other name is user content.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(Self::BLEED_GUIDE_NAME) => Role::BleedGuide,
            Some(Self::SAFE_GUIDE_NAME) => Role::SafeGuide,
            Some(Self::SHAPE_OUTLINE_NAME) => Role::ShapeOutline,
            _ => Role::Content,
        }
    }

    pub fn wire_name(self) -> Option<&'static str> {
        match self {
            Role::Content => None,
            Role::BleedGuide => Some(Self::BLEED_GUIDE_NAME),
            Role::SafeGuide => Some(Self::SAFE_GUIDE_NAME),
            Role::ShapeOutline => Some(Self::SHAPE_OUTLINE_NAME),
        }
    }

    /// True for every non-printable overlay role
    pub fn is_overlay(self) -> bool {
        self != Role::Content
    }
}

/// Type-specific geometry and payload
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Text {
        text: String,
        font_size: f64,
        font_family: Option<String>,
    },
    Rect {
        width: f64,
        height: f64,
    },
    Ellipse {
        radius: f64,
    },
    Image {
        width: f64,
        height: f64,
        src: Option<String>,
    },
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Text { .. } => "text",
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Ellipse { .. } => "circle",
            ObjectKind::Image { .. } => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_dash_array: Option<Vec<f64>>,
    pub opacity: Option<f64>,
}

/// Axis-aligned box in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    pub style: Style,
    pub role: Role,
    /// Free-form name carried by content objects
    pub label: Option<String>,
    pub selectable: bool,
    pub evented: bool,
}

impl SceneObject {
    fn with_kind(kind: ObjectKind, left: f64, top: f64) -> Self {
        Self {
            kind,
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            style: Style::default(),
            role: Role::Content,
            label: None,
            selectable: true,
            evented: true,
        }
    }

    pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::with_kind(ObjectKind::Rect { width, height }, left, top)
    }

    pub fn ellipse(left: f64, top: f64, radius: f64) -> Self {
        Self::with_kind(ObjectKind::Ellipse { radius }, left, top)
    }

    pub fn text(left: f64, top: f64, text: impl Into<String>, font_size: f64) -> Self {
        Self::with_kind(
            ObjectKind::Text {
                text: text.into(),
                font_size,
                font_family: None,
            },
            left,
            top,
        )
    }

    pub fn image(left: f64, top: f64, width: f64, height: f64, src: impl Into<String>) -> Self {
        Self::with_kind(
            ObjectKind::Image {
                width,
                height,
                src: Some(src.into()),
            },
            left,
            top,
        )
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.style.fill = Some(fill.into());
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>, width: f64) -> Self {
        self.style.stroke = Some(stroke.into());
        self.style.stroke_width = Some(width);
        self
    }

    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.style.stroke_dash_array = Some(dash);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// The wire `name`: the role name for overlays, the label for content
    pub fn name(&self) -> Option<&str> {
        self.role.wire_name().or(self.label.as_deref())
    }

    /// Unrotated bounding box in screen pixels. Text width is estimated from
    /// the glyph count since no font metrics are available here.
    pub fn bounds(&self) -> Bounds {
        let (width, height) = match &self.kind {
            ObjectKind::Rect { width, height } | ObjectKind::Image { width, height, .. } => {
                (*width, *height)
            }
            ObjectKind::Ellipse { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Text {
                text, font_size, ..
            } => {
                let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                let lines = text.lines().count().max(1);
                (
                    longest as f64 * font_size * TEXT_CHAR_WIDTH_RATIO,
                    lines as f64 * font_size * TEXT_LINE_HEIGHT,
                )
            }
        };
        Bounds {
            left: self.left,
            top: self.top,
            width: width * self.scale_x,
            height: height * self.scale_y,
        }
    }

    /// Uniformly rescale position and size, e.g. when the canvas zoom changes.
    pub fn rescale(&mut self, factor: f64) {
        self.left *= factor;
        self.top *= factor;
        self.scale_x *= factor;
        self.scale_y *= factor;
    }

    // -------------------------------------------------------------------------
    // Wire conversion
    // -------------------------------------------------------------------------

    /// Build a typed object from one JSON entry of a snapshot's `objects`.
    pub fn from_json_value(value: Value, index: usize) -> Result<Self> {
        if !value.is_object() {
            return Err(EditorError::MalformedSnapshot(format!(
                "object {index} is not a JSON object"
            )));
        }
        let raw: RawObject = serde_json::from_value(value)
            .map_err(|e| EditorError::MalformedSnapshot(format!("object {index}: {e}")))?;
        Self::from_raw(raw, index)
    }

    fn from_raw(raw: RawObject, index: usize) -> Result<Self> {
        let missing = |field: &str| {
            EditorError::MalformedSnapshot(format!(
                "object {index} ({}) is missing `{field}`",
                raw.kind
            ))
        };

        let kind = match raw.kind.as_str() {
            "text" | "i-text" | "textbox" => ObjectKind::Text {
                text: raw.text.clone().ok_or_else(|| missing("text"))?,
                font_size: raw.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                font_family: raw.font_family.clone(),
            },
            "rect" => ObjectKind::Rect {
                width: raw.width.ok_or_else(|| missing("width"))?,
                height: raw.height.ok_or_else(|| missing("height"))?,
            },
            "circle" => ObjectKind::Ellipse {
                radius: raw.radius.ok_or_else(|| missing("radius"))?,
            },
            "image" => ObjectKind::Image {
                width: raw.width.ok_or_else(|| missing("width"))?,
                height: raw.height.ok_or_else(|| missing("height"))?,
                src: raw.src.clone(),
            },
            other => {
                return Err(EditorError::MalformedSnapshot(format!(
                    "object {index} has unknown type `{other}`"
                )));
            }
        };

        let role = Role::from_name(raw.name.as_deref());
        let label = if role == Role::Content { raw.name } else { None };

        Ok(Self {
            kind,
            left: raw.left,
            top: raw.top,
            scale_x: raw.scale_x,
            scale_y: raw.scale_y,
            angle: raw.angle,
            style: Style {
                fill: raw.fill,
                stroke: raw.stroke,
                stroke_width: raw.stroke_width,
                stroke_dash_array: raw.stroke_dash_array,
                opacity: raw.opacity,
            },
            role,
            label,
            selectable: raw.selectable,
            evented: raw.evented,
        })
    }

    fn to_raw(&self) -> RawObject {
        let mut raw = RawObject {
            kind: self.kind.type_name().to_string(),
            left: self.left,
            top: self.top,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            angle: self.angle,
            fill: self.style.fill.clone(),
            stroke: self.style.stroke.clone(),
            stroke_width: self.style.stroke_width,
            stroke_dash_array: self.style.stroke_dash_array.clone(),
            opacity: self.style.opacity,
            name: self.name().map(str::to_string),
            selectable: self.selectable,
            evented: self.evented,
            ..RawObject::default()
        };
        match &self.kind {
            ObjectKind::Text {
                text,
                font_size,
                font_family,
            } => {
                raw.text = Some(text.clone());
                raw.font_size = Some(*font_size);
                raw.font_family = font_family.clone();
            }
            ObjectKind::Rect { width, height } => {
                raw.width = Some(*width);
                raw.height = Some(*height);
            }
            ObjectKind::Ellipse { radius } => raw.radius = Some(*radius),
            ObjectKind::Image { width, height, src } => {
                raw.width = Some(*width);
                raw.height = Some(*height);
                raw.src = src.clone();
            }
        }
        raw
    }
}

impl Serialize for SceneObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SceneObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawObject::deserialize(deserializer)?;
        SceneObject::from_raw(raw, 0).map_err(serde::de::Error::custom)
    }
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Exact wire shape of one object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    left: f64,
    #[serde(default)]
    top: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    #[serde(default = "one")]
    scale_x: f64,
    #[serde(default = "one")]
    scale_y: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    angle: f64,
    #[serde(default)]
    fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke_dash_array: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<String>,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    selectable: bool,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    evented: bool,
}

impl Default for RawObject {
    fn default() -> Self {
        Self {
            kind: String::new(),
            left: 0.0,
            top: 0.0,
            width: None,
            height: None,
            radius: None,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            fill: None,
            stroke: None,
            stroke_width: None,
            stroke_dash_array: None,
            opacity: None,
            name: None,
            text: None,
            font_size: None,
            font_family: None,
            src: None,
            selectable: true,
            evented: true,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Whether overlay objects are written into a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidePolicy {
    /// Content only: persistence, history, export
    Exclude,
    /// Everything, overlays included: diagnostics
    Include,
}

/// Serializable state of a scene: the unit of persistence, history,
/// autosave, and template payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub background: String,
    pub objects: Vec<SceneObject>,
    /// Display size the pixel coordinates were recorded at
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            objects: Vec::new(),
            canvas_width: None,
            canvas_height: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    objects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    canvas_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    canvas_height: Option<f64>,
}

impl SceneSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EditorError::MalformedSnapshot(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a snapshot from an already-decoded JSON value. Every object is
    /// validated before anything is returned.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(EditorError::MalformedSnapshot(
                "snapshot is not a JSON object".to_string(),
            ));
        }
        let raw: RawSnapshot = serde_json::from_value(value)
            .map_err(|e| EditorError::MalformedSnapshot(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSnapshot) -> Result<Self> {
        let entries = match raw.objects {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(EditorError::MalformedSnapshot(
                    "`objects` is not an array".to_string(),
                ));
            }
        };
        let objects = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| SceneObject::from_json_value(entry, index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            background: raw
                .background
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            objects,
            canvas_width: raw.canvas_width,
            canvas_height: raw.canvas_height,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// True when no overlay object is present
    pub fn is_guide_free(&self) -> bool {
        self.objects.iter().all(|o| !o.role.is_overlay())
    }

    /// Copy of this snapshot with every overlay object removed
    pub fn without_overlays(&self) -> Self {
        Self {
            objects: self
                .objects
                .iter()
                .filter(|o| !o.role.is_overlay())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Copy of this snapshot expressed at another display size. Snapshots
    /// without a recorded canvas size are taken as laid out in print pixels,
    /// the same reading [`DocumentScale::for_canvas`] gives them at export.
    ///
    /// [`DocumentScale::for_canvas`]: crate::transform::DocumentScale::for_canvas
    pub fn rescaled_to(
        &self,
        spec: &PrintSpecification,
        display_width: f64,
        display_height: f64,
    ) -> Self {
        let mut rescaled = self.clone();
        let recorded = self
            .canvas_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or_else(|| spec.print_width_px());
        if recorded > 0.0 {
            let factor = display_width / recorded;
            if (factor - 1.0).abs() > f64::EPSILON {
                for object in &mut rescaled.objects {
                    object.rescale(factor);
                }
            }
        }
        rescaled.canvas_width = Some(display_width);
        rescaled.canvas_height = Some(display_height);
        rescaled
    }
}

impl Serialize for SceneSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let objects = self
            .objects
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(serde::ser::Error::custom)?;
        RawSnapshot {
            background: Some(self.background.clone()),
            objects: Some(Value::Array(objects)),
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SceneSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawSnapshot::deserialize(deserializer)?;
        SceneSnapshot::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Live scene
// =============================================================================

/// Ordered object list owned by one editor session
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    objects: Vec<SceneObject>,
    background: String,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}

impl Scene {
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            objects: Vec::new(),
            background: background.into(),
        }
    }

    /// Rebuild a live scene from a snapshot
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        Self {
            objects: snapshot.objects.clone(),
            background: snapshot.background.clone(),
        }
    }

    pub fn to_snapshot(&self, policy: GuidePolicy, canvas: Option<(f64, f64)>) -> SceneSnapshot {
        let objects = match policy {
            GuidePolicy::Include => self.objects.clone(),
            GuidePolicy::Exclude => self
                .objects
                .iter()
                .filter(|o| !o.role.is_overlay())
                .cloned()
                .collect(),
        };
        SceneSnapshot {
            background: self.background.clone(),
            objects,
            canvas_width: canvas.map(|(w, _)| w),
            canvas_height: canvas.map(|(_, h)| h),
        }
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn set_background(&mut self, background: impl Into<String>) {
        self.background = background.into();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    /// Append on top of the z-order, returning the new index
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Insert at a z-order index, clamped to the end
    pub fn insert(&mut self, index: usize, object: SceneObject) -> usize {
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    /// Move an object to another z-order position
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.objects.len() {
            return false;
        }
        let object = self.objects.remove(from);
        let to = to.min(self.objects.len());
        self.objects.insert(to, object);
        true
    }

    pub fn bring_to_front(&mut self, index: usize) -> bool {
        let last = self.objects.len().saturating_sub(1);
        self.move_to(index, last)
    }

    pub fn send_to_back(&mut self, index: usize) -> bool {
        self.move_to(index, 0)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn retain(&mut self, keep: impl FnMut(&SceneObject) -> bool) {
        self.objects.retain(keep);
    }

    pub fn position_of(&self, role: Role) -> Option<usize> {
        self.objects.iter().position(|o| o.role == role)
    }

    pub fn find_role(&self, role: Role) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.role == role)
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.objects.iter().filter(|o| o.role == role).count()
    }

    pub fn content(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.role == Role::Content)
    }

    pub fn content_len(&self) -> usize {
        self.content().count()
    }

    /// Swap out all content, leaving overlays in place
    pub fn replace_content(&mut self, content: Vec<SceneObject>) {
        self.objects.retain(|o| o.role.is_overlay());
        self.objects.extend(content);
    }

    /// Topmost evented object under a screen point
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        self.objects
            .iter()
            .enumerate()
            .rev()
            .find(|(_, o)| o.evented && o.bounds().contains(x, y))
            .map(|(index, _)| index)
    }

    /// Stable reorder by layer rank, lowest rank at the bottom
    pub fn sort_layers(&mut self, rank: impl FnMut(&SceneObject) -> u8) {
        self.objects.sort_by_key(rank);
    }

    /// Rescale content objects; overlays are recomputed, never rescaled
    pub fn rescale_content(&mut self, factor: f64) {
        for object in self.objects.iter_mut().filter(|o| o.role == Role::Content) {
            object.rescale(factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_snapshot() -> SceneSnapshot {
        SceneSnapshot {
            background: "#fafafa".to_string(),
            objects: vec![
                SceneObject::rect(10.0, 20.0, 100.0, 50.0)
                    .with_fill("#ff0000")
                    .with_stroke("#000000", 2.0)
                    .with_dash(vec![4.0, 2.0]),
                SceneObject::ellipse(5.0, 5.0, 30.0)
                    .with_fill("rgb(0,128,0)")
                    .with_scale(1.5, 0.5),
                SceneObject::text(40.0, 60.0, "Hello\nWorld", 24.0)
                    .with_fill("#222")
                    .with_label("headline"),
                SceneObject::image(0.0, 0.0, 200.0, 100.0, "https://cdn.example/a.png"),
            ],
            canvas_width: Some(450.0),
            canvas_height: Some(450.0),
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_structure() {
        let snapshot = sample_snapshot();
        let json = snapshot.to_json().unwrap();
        let restored = SceneSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);

        let again = SceneSnapshot::from_json(&restored.to_json().unwrap()).unwrap();
        assert_eq!(again, restored);
    }

    #[test]
    fn wire_shape_uses_circle_and_camel_case() {
        let value = sample_snapshot().to_value().unwrap();
        let objects = value["objects"].as_array().unwrap();
        assert_eq!(objects[0]["type"], "rect");
        assert_eq!(objects[0]["strokeDashArray"], json!([4.0, 2.0]));
        assert_eq!(objects[1]["type"], "circle");
        assert_eq!(objects[1]["scaleX"], json!(1.5));
        assert_eq!(objects[2]["fontSize"], json!(24.0));
        assert_eq!(objects[2]["name"], "headline");
        assert_eq!(value["canvasWidth"], json!(450.0));
    }

    #[test]
    fn guide_names_become_roles() {
        let snapshot = SceneSnapshot::from_value(json!({
            "background": "#fff",
            "objects": [
                {"type": "rect", "width": 10, "height": 10, "name": "bleedGuide"},
                {"type": "rect", "width": 10, "height": 10, "name": "safeGuide"},
                {"type": "image", "width": 10, "height": 10, "name": "customShapeOutline"},
                {"type": "rect", "width": 10, "height": 10, "name": "logo"}
            ]
        }))
        .unwrap();
        let roles: Vec<Role> = snapshot.objects.iter().map(|o| o.role).collect();
        assert_eq!(
            roles,
            vec![Role::BleedGuide, Role::SafeGuide, Role::ShapeOutline, Role::Content]
        );
        assert_eq!(snapshot.objects[3].label.as_deref(), Some("logo"));
        assert!(!snapshot.is_guide_free());
        assert!(snapshot.without_overlays().is_guide_free());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            SceneSnapshot::from_json("{oops"),
            Err(EditorError::MalformedSnapshot(_))
        ));
        assert!(SceneSnapshot::from_value(json!({"objects": {"a": 1}})).is_err());
        assert!(SceneSnapshot::from_value(json!({"objects": [{"type": "polygon"}]})).is_err());
        assert!(SceneSnapshot::from_value(json!({"objects": [{"type": "rect", "width": 3}]})).is_err());
        assert!(SceneSnapshot::from_value(json!({"objects": [{"type": "circle"}]})).is_err());
        assert!(SceneSnapshot::from_value(json!({"objects": [42]})).is_err());
        assert!(SceneSnapshot::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn missing_objects_is_an_empty_scene() {
        let snapshot = SceneSnapshot::from_value(json!({})).unwrap();
        assert!(snapshot.objects.is_empty());
        assert_eq!(snapshot.background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn defaults_fill_in_optional_geometry() {
        let snapshot = SceneSnapshot::from_value(json!({
            "objects": [{"type": "i-text", "text": "hi"}]
        }))
        .unwrap();
        let text = &snapshot.objects[0];
        assert_eq!(text.scale_x, 1.0);
        assert!(matches!(
            text.kind,
            ObjectKind::Text { font_size, .. } if font_size == DEFAULT_FONT_SIZE
        ));
        assert!(text.selectable && text.evented);
    }

    #[test]
    fn z_order_operations() {
        let mut scene = Scene::default();
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0).with_label("a"));
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0).with_label("b"));
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0).with_label("c"));

        assert!(scene.bring_to_front(0));
        let labels: Vec<_> = scene.iter().map(|o| o.label.clone().unwrap()).collect();
        assert_eq!(labels, ["b", "c", "a"]);

        assert!(scene.send_to_back(2));
        let labels: Vec<_> = scene.iter().map(|o| o.label.clone().unwrap()).collect();
        assert_eq!(labels, ["a", "b", "c"]);

        assert!(!scene.move_to(7, 0));
        assert_eq!(scene.remove(1).unwrap().label.as_deref(), Some("b"));
        assert!(scene.remove(5).is_none());
    }

    #[test]
    fn hit_test_skips_non_evented_objects() {
        let mut scene = Scene::default();
        scene.add(SceneObject::rect(0.0, 0.0, 100.0, 100.0));
        let mut overlay = SceneObject::rect(0.0, 0.0, 100.0, 100.0).with_role(Role::ShapeOutline);
        overlay.evented = false;
        scene.add(overlay);

        assert_eq!(scene.hit_test(50.0, 50.0), Some(0));
        assert_eq!(scene.hit_test(150.0, 50.0), None);
    }

    #[test]
    fn rescale_snapshot_to_new_display() {
        let snapshot = sample_snapshot();
        let spec = PrintSpecification::default();
        let doubled = snapshot.rescaled_to(&spec, 900.0, 900.0);
        assert_eq!(doubled.objects[0].left, 20.0);
        assert_eq!(doubled.objects[0].scale_x, 2.0);
        assert_eq!(doubled.objects[1].scale_y, 1.0);
        assert_eq!(doubled.canvas_width, Some(900.0));

        let back = doubled.rescaled_to(&spec, 450.0, 450.0);
        assert_eq!(back, snapshot);
    }

    #[test]
    fn snapshot_without_canvas_size_is_in_print_pixels() {
        let spec = PrintSpecification::default();
        let snapshot = SceneSnapshot {
            canvas_width: None,
            canvas_height: None,
            ..sample_snapshot()
        };

        // 900 print px shown at 450
        let halved = snapshot.rescaled_to(&spec, 450.0, 450.0);
        assert_eq!(halved.objects[0].left, 5.0);
        assert_eq!(halved.objects[0].top, 10.0);
        assert_eq!(halved.objects[0].scale_x, 0.5);
        assert_eq!(halved.canvas_width, Some(450.0));

        let full = snapshot.rescaled_to(&spec, 900.0, 900.0);
        assert_eq!(full.objects, snapshot.objects);
    }
}
