//! Guide overlay management
//!
//! Guides are non-printable overlays: the trim line (drawn at the canvas
//! edge, since the canvas is the trim box), the dashed safe-zone line, and an
//! optional die-cut outline. Their geometry is always computed from the
//! inch-based print specification through the coordinate transform, never by
//! scaling previous pixel values.
//!
//! Stacking: shape outline at the bottom, content in the middle, bleed guide
//! and then safe guide on top.

use crate::constants::*;
use crate::print_spec::PrintSpecification;
use crate::scene::{ObjectKind, Role, Scene, SceneObject};
use crate::transform::{ViewportFit, to_screen_px};

/// Inset of the trim/bleed guide from the canvas edge, in screen pixels.
/// The canvas is the trim box, so the trim line sits on the edge.
pub fn bleed_inset_px(_spec: &PrintSpecification, _fit: &ViewportFit) -> f64 {
    0.0
}

/// Inset of the safe-zone guide from the canvas edge, in screen pixels
pub fn safe_inset_px(spec: &PrintSpecification, fit: &ViewportFit) -> f64 {
    to_screen_px(spec.safe_zone_in, spec, fit.fit_scale)
}

fn overlay(mut object: SceneObject, role: Role) -> SceneObject {
    object.role = role;
    object.selectable = false;
    object.evented = false;
    object
}

/// Trim line covering the whole display canvas
pub fn bleed_guide(spec: &PrintSpecification, fit: &ViewportFit) -> SceneObject {
    let inset = bleed_inset_px(spec, fit);
    overlay(
        SceneObject::rect(
            inset,
            inset,
            fit.display_width_px - 2.0 * inset,
            fit.display_height_px - 2.0 * inset,
        )
        .with_stroke(BLEED_GUIDE_STROKE, GUIDE_STROKE_WIDTH),
        Role::BleedGuide,
    )
}

/// Dashed safe-zone line inset by the safe-zone width
pub fn safe_guide(spec: &PrintSpecification, fit: &ViewportFit) -> SceneObject {
    let inset = safe_inset_px(spec, fit);
    overlay(
        SceneObject::rect(
            inset,
            inset,
            (fit.display_width_px - 2.0 * inset).max(0.0),
            (fit.display_height_px - 2.0 * inset).max(0.0),
        )
        .with_stroke(SAFE_GUIDE_STROKE, GUIDE_STROKE_WIDTH)
        .with_dash(SAFE_GUIDE_DASH.to_vec()),
        Role::SafeGuide,
    )
}

/// Die-cut outline image stretched over the canvas
pub fn shape_outline(url: &str, fit: &ViewportFit) -> SceneObject {
    let mut outline = overlay(
        SceneObject::image(0.0, 0.0, fit.display_width_px, fit.display_height_px, url),
        Role::ShapeOutline,
    );
    outline.style.opacity = Some(SHAPE_OUTLINE_OPACITY);
    outline
}

fn layer_rank(object: &SceneObject) -> u8 {
    match object.role {
        Role::ShapeOutline => 0,
        Role::Content => 1,
        Role::BleedGuide => 2,
        Role::SafeGuide => 3,
    }
}

/// Restore the overlay stacking order without disturbing content order
pub fn pin(scene: &mut Scene) {
    scene.sort_layers(layer_rank);
}

/// Insert fresh bleed and safe guides, replacing any existing ones
pub fn install(scene: &mut Scene, spec: &PrintSpecification, fit: &ViewportFit) {
    scene.retain(|o| !matches!(o.role, Role::BleedGuide | Role::SafeGuide));
    scene.add(bleed_guide(spec, fit));
    scene.add(safe_guide(spec, fit));
    pin(scene);
}

/// Recreate any guide that has gone missing. Returns how many were recreated.
pub fn ensure(scene: &mut Scene, spec: &PrintSpecification, fit: &ViewportFit) -> usize {
    let mut recreated = 0;
    if scene.position_of(Role::BleedGuide).is_none() {
        log::warn!("Bleed guide missing, recreating from print specification");
        scene.add(bleed_guide(spec, fit));
        recreated += 1;
    }
    if scene.position_of(Role::SafeGuide).is_none() {
        log::warn!("Safe guide missing, recreating from print specification");
        scene.add(safe_guide(spec, fit));
        recreated += 1;
    }
    if recreated > 0 {
        pin(scene);
    }
    recreated
}

/// Re-project every overlay at a new fit scale
pub fn recompute(scene: &mut Scene, spec: &PrintSpecification, fit: &ViewportFit) {
    let outline_src = scene.find_role(Role::ShapeOutline).and_then(|o| match &o.kind {
        ObjectKind::Image { src, .. } => src.clone(),
        _ => None,
    });

    scene.retain(|o| !o.role.is_overlay());
    scene.add(bleed_guide(spec, fit));
    scene.add(safe_guide(spec, fit));
    if let Some(src) = outline_src {
        scene.add(shape_outline(&src, fit));
    }
    pin(scene);
}

/// Place a die-cut outline at the back, replacing any previous one
pub fn add_shape_outline(scene: &mut Scene, url: &str, fit: &ViewportFit) {
    scene.retain(|o| o.role != Role::ShapeOutline);
    scene.add(shape_outline(url, fit));
    pin(scene);
}

/// Overlays removed from a scene for the duration of an export
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrippedGuides {
    objects: Vec<SceneObject>,
}

impl StrippedGuides {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Remove (not hide) every overlay
pub fn strip(scene: &mut Scene) -> StrippedGuides {
    let objects = scene.iter().filter(|o| o.role.is_overlay()).cloned().collect();
    scene.retain(|o| !o.role.is_overlay());
    StrippedGuides { objects }
}

/// Put stripped overlays back and re-pin them
pub fn restore(scene: &mut Scene, stripped: StrippedGuides) {
    for object in stripped.objects {
        scene.add(object);
    }
    pin(scene);
}

/// Overlay geometry captured before a destructive scene operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuideGeometry {
    pub bleed: Option<SceneObject>,
    pub safe: Option<SceneObject>,
    pub outline: Option<SceneObject>,
}

pub fn capture(scene: &Scene) -> GuideGeometry {
    GuideGeometry {
        bleed: scene.find_role(Role::BleedGuide).cloned(),
        safe: scene.find_role(Role::SafeGuide).cloned(),
        outline: scene.find_role(Role::ShapeOutline).cloned(),
    }
}

/// Recreate overlays from captured geometry. A guide that was missing at
/// capture time is rebuilt from the print specification instead.
pub fn install_from_geometry(
    scene: &mut Scene,
    geometry: &GuideGeometry,
    spec: &PrintSpecification,
    fit: &ViewportFit,
) {
    scene.retain(|o| !o.role.is_overlay());
    if let Some(outline) = &geometry.outline {
        scene.add(outline.clone());
    }
    match &geometry.bleed {
        Some(bleed) => scene.add(bleed.clone()),
        None => scene.add(bleed_guide(spec, fit)),
    };
    match &geometry.safe {
        Some(safe) => scene.add(safe.clone()),
        None => scene.add(safe_guide(spec, fit)),
    };
    pin(scene);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> PrintSpecification {
        PrintSpecification::new(3.0, 3.0, 300, 0.125, 0.125).unwrap()
    }

    #[test]
    fn unit_scale_insets() {
        let spec = spec();
        let fit = ViewportFit::compute(&spec, 1200.0, 1200.0);
        assert_eq!(fit.fit_scale, 1.0);
        assert_eq!(bleed_inset_px(&spec, &fit), 0.0);
        assert_eq!(safe_inset_px(&spec, &fit), 37.5);

        let safe = safe_guide(&spec, &fit);
        assert_eq!((safe.left, safe.top), (37.5, 37.5));
        assert!(matches!(safe.kind, ObjectKind::Rect { width, .. } if width == 825.0));
        assert!(!safe.selectable && !safe.evented);
    }

    #[test]
    fn install_pins_guides_above_content() {
        let spec = spec();
        let fit = ViewportFit::with_scale(&spec, 0.5);
        let mut scene = Scene::default();
        scene.add(SceneObject::rect(1.0, 1.0, 5.0, 5.0));
        install(&mut scene, &spec, &fit);
        scene.add(SceneObject::rect(2.0, 2.0, 5.0, 5.0));
        pin(&mut scene);

        let roles: Vec<Role> = scene.iter().map(|o| o.role).collect();
        assert_eq!(
            roles,
            [Role::Content, Role::Content, Role::BleedGuide, Role::SafeGuide]
        );
    }

    #[test]
    fn repeated_zoom_matches_direct_computation() {
        let spec = spec();
        let mut scene = Scene::default();
        install(&mut scene, &spec, &ViewportFit::with_scale(&spec, 1.0));
        for scale in [0.37, 0.91, 0.13, 0.5, 0.777] {
            recompute(&mut scene, &spec, &ViewportFit::with_scale(&spec, scale));
        }

        let mut direct = Scene::default();
        install(&mut direct, &spec, &ViewportFit::with_scale(&spec, 0.777));
        assert_eq!(scene, direct);

        // inset relative to canvas size is the same ratio in inches
        let fit = ViewportFit::with_scale(&spec, 0.777);
        let ratio = safe_inset_px(&spec, &fit) / fit.display_width_px;
        assert!((ratio - spec.safe_zone_in / spec.print_width_in).abs() < 1e-12);
    }

    #[test]
    fn missing_guides_are_recreated() {
        let spec = spec();
        let fit = ViewportFit::with_scale(&spec, 0.4);
        let mut scene = Scene::default();
        install(&mut scene, &spec, &fit);
        scene.clear();
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0));

        assert_eq!(ensure(&mut scene, &spec, &fit), 2);
        assert_eq!(ensure(&mut scene, &spec, &fit), 0);
        assert_eq!(scene.find_role(Role::SafeGuide), Some(&safe_guide(&spec, &fit)));
    }

    #[test]
    fn shape_outline_sits_at_the_back() {
        let spec = spec();
        let fit = ViewportFit::with_scale(&spec, 0.5);
        let mut scene = Scene::default();
        install(&mut scene, &spec, &fit);
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0));
        add_shape_outline(&mut scene, "https://cdn.example/shape.png", &fit);

        let outline = scene.get(0).unwrap();
        assert_eq!(outline.role, Role::ShapeOutline);
        assert_eq!(outline.style.opacity, Some(SHAPE_OUTLINE_OPACITY));
        assert!(!outline.evented && !outline.selectable);
        assert_eq!(scene.get(scene.len() - 1).unwrap().role, Role::SafeGuide);
    }

    #[test]
    fn strip_and_restore() {
        let spec = spec();
        let fit = ViewportFit::with_scale(&spec, 0.5);
        let mut scene = Scene::default();
        scene.add(SceneObject::rect(0.0, 0.0, 1.0, 1.0));
        install(&mut scene, &spec, &fit);
        add_shape_outline(&mut scene, "shape.svg", &fit);
        let before = scene.clone();

        let stripped = strip(&mut scene);
        assert_eq!(stripped.len(), 3);
        assert_eq!(scene.len(), 1);
        assert!(scene.iter().all(|o| !o.role.is_overlay()));

        restore(&mut scene, stripped);
        assert_eq!(scene, before);
    }
}
