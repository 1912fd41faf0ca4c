use serde_json::json;
use sticker_editor::*;
use std::sync::Arc;
use std::time::Duration;

fn three_inch() -> PrintSpecification {
    PrintSpecification::resolve(&ProductRecord {
        print_width: Some(json!(3)),
        print_height: Some(json!("3")),
        print_dpi: Some(json!(300)),
        bleed_size: Some(json!(0.125)),
        safe_zone: Some(json!(0.125)),
    })
}

fn open_large() -> EditorSession<HeadlessEngine> {
    EditorSession::open(
        three_inch(),
        EditorConfig::default(),
        HeadlessEngine::new(),
        1200.0,
        1200.0,
    )
    .unwrap()
}

fn content_fills<E: RenderingEngine, S: DesignStore>(session: &EditorSession<E, S>) -> Vec<Option<String>> {
    session
        .scene()
        .content()
        .map(|o| o.style.fill.clone())
        .collect()
}

#[test]
fn test_viewport_scenario() {
    let spec = three_inch();
    let session: EditorSession<HeadlessEngine> = EditorSession::open(
        spec,
        EditorConfig::default(),
        HeadlessEngine::new(),
        350.0,
        350.0,
    )
    .unwrap();

    let fit = session.fit();
    assert!((fit.fit_scale - 310.0 / 900.0).abs() < 1e-12);
    assert!((fit.display_width_px - 310.0).abs() < 1e-9);

    let safe = session.scene().find_role(Role::SafeGuide).unwrap();
    let expected_inset = 0.125 * 300.0 * fit.fit_scale;
    assert!((safe.left - expected_inset).abs() < 1e-9);

    let bleed = session.scene().find_role(Role::BleedGuide).unwrap();
    assert_eq!((bleed.left, bleed.top), (0.0, 0.0));
}

#[test]
fn test_unit_scale_guides() {
    let session = open_large();
    assert_eq!(session.fit().fit_scale, 1.0);
    assert_eq!(session.fit().display_width_px, 900.0);
    let safe = session.scene().find_role(Role::SafeGuide).unwrap();
    assert_eq!(safe.left, 37.5);
    assert!(matches!(safe.kind, ObjectKind::Rect { width, height } if width == 825.0 && height == 825.0));
}

#[test]
fn test_add_modify_undo_scenario() {
    let mut session = open_large();
    let index = session
        .add_object(SceneObject::rect(100.0, 100.0, 200.0, 100.0).with_fill("#ff0000"))
        .unwrap();
    session
        .modify_object(index, |o| o.style.fill = Some("#00ff00".to_string()))
        .unwrap();
    assert_eq!(content_fills(&session), [Some("#00ff00".to_string())]);

    assert!(session.undo());
    assert_eq!(content_fills(&session), [Some("#ff0000".to_string())]);
    assert!(session.undo());
    assert_eq!(session.scene().content_len(), 0);
    assert!(!session.undo());

    assert!(session.redo());
    assert!(session.redo());
    assert_eq!(content_fills(&session), [Some("#00ff00".to_string())]);
    assert!(!session.redo());

    // guides survive every step
    assert_eq!(session.scene().count_role(Role::BleedGuide), 1);
    assert_eq!(session.scene().count_role(Role::SafeGuide), 1);
}

#[test]
fn test_new_mutation_clears_redo() {
    let mut session = open_large();
    session.add_object(SceneObject::ellipse(0.0, 0.0, 10.0)).unwrap();
    session.undo();
    assert!(session.can_redo());
    session.add_object(SceneObject::ellipse(5.0, 5.0, 10.0)).unwrap();
    assert!(!session.can_redo());
}

#[test]
fn test_guides_stay_pinned_after_content_changes() {
    let mut session = open_large();
    session.set_custom_shape("https://cdn.example/die.svg");
    let a = session.add_object(SceneObject::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    session.add_object(SceneObject::text(0.0, 0.0, "hi", 20.0)).unwrap();
    session.move_object(a, 100).unwrap();

    let roles: Vec<Role> = session.scene().iter().map(|o| o.role).collect();
    assert_eq!(
        roles,
        [
            Role::ShapeOutline,
            Role::Content,
            Role::Content,
            Role::BleedGuide,
            Role::SafeGuide
        ]
    );
    // overlays cannot be targeted by content operations
    assert!(session.remove_object(0).is_err());
    assert!(session.add_object(SceneObject::rect(0.0, 0.0, 1.0, 1.0).with_role(Role::SafeGuide)).is_err());
}

#[test]
fn test_template_with_stray_guides() {
    let mut session = open_large();
    session.add_object(SceneObject::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    let renders = session.engine().render_count;

    let template = json!({
        "background": "#fffbe6",
        "objects": [
            {"type": "rect", "width": 900, "height": 900, "name": "bleedGuide"},
            {"type": "text", "text": "SALE", "left": 100, "top": 100},
            {"type": "circle", "radius": 50},
            {"type": "rect", "width": 900, "height": 900, "name": "bleedGuide"},
            {"type": "rect", "width": 30, "height": 30, "fill": "#333"}
        ]
    })
    .to_string();

    let report = session.apply_template_json(&template).unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.dropped_guides, 2);

    let scene = session.scene();
    assert_eq!(scene.content_len(), 3);
    assert_eq!(scene.count_role(Role::BleedGuide), 1);
    assert_eq!(scene.count_role(Role::SafeGuide), 1);
    assert_eq!(scene.len(), 5);
    assert_eq!(scene.background(), "#fffbe6");
    assert_eq!(session.engine().render_count, renders + 1);

    // one undo returns the pre-template state
    assert!(session.undo());
    assert_eq!(session.scene().content_len(), 1);
    assert_eq!(session.scene().background(), "#ffffff");
}

#[test]
fn test_malformed_template_leaves_scene_untouched() {
    let mut session = open_large();
    session.add_object(SceneObject::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    let before = session.scene().clone();
    let undo_depth = session.history().undo_len();
    let renders = session.engine().render_count;

    for bad in [
        "{not json",
        r#"{"objects": 7}"#,
        r##"{"background": "#000"}"##,
        r#"{"objects": [{"type": "rect", "width": 1}]}"#,
    ] {
        assert!(matches!(
            session.apply_template_json(bad),
            Err(EditorError::MalformedTemplate(_))
        ));
    }

    assert_eq!(session.scene(), &before);
    assert_eq!(session.history().undo_len(), undo_depth);
    assert_eq!(session.engine().render_count, renders);
}

#[test]
fn test_export_raster_excludes_guides() {
    let mut session = open_large();
    session.set_custom_shape("shape.png");
    session.add_object(SceneObject::text(10.0, 10.0, "Hello", 30.0)).unwrap();
    let before = session.scene().clone();

    let url = session.export_raster(2.0).unwrap();
    assert!(url.starts_with("data:image/png"));

    let exported = session.engine().last_export.clone().unwrap();
    assert!(exported.is_guide_free());
    assert_eq!(exported.objects.len(), 1);
    assert_eq!(exported.canvas_width, Some(900.0));
    assert_eq!(session.engine().last_multiplier, Some(2.0));

    assert_eq!(session.scene(), &before);
}

#[test]
fn test_zoom_recomputes_guides_and_scales_content() {
    let spec = three_inch();
    let mut session = open_large();
    session.add_object(SceneObject::rect(90.0, 90.0, 100.0, 100.0)).unwrap();

    for scale in [0.31, 0.87, 0.12, 0.5] {
        session.set_zoom(scale);
    }

    let fit = *session.fit();
    assert_eq!(fit.display_width_px, 450.0);
    let mut direct = Scene::default();
    guides::install(&mut direct, &spec, &fit);
    assert_eq!(
        session.scene().find_role(Role::SafeGuide),
        direct.find_role(Role::SafeGuide)
    );

    let rect = session.scene().content().next().unwrap();
    assert!((rect.left - 45.0).abs() < 1e-9);
    assert!((rect.scale_x - 0.5).abs() < 1e-9);

    // zoom is not an undoable step
    assert_eq!(session.history().undo_len(), 1);
}

#[test]
fn test_undo_after_zoom_restores_at_current_scale() {
    let mut session = open_large();
    let index = session
        .add_object(SceneObject::rect(100.0, 100.0, 10.0, 10.0))
        .unwrap();
    session.modify_object(index, |o| o.left = 300.0).unwrap();
    session.set_zoom(0.5);
    assert!(session.undo());

    let rect = session.scene().content().next().unwrap();
    assert!((rect.left - 50.0).abs() < 1e-9);
    assert!((rect.scale_x - 0.5).abs() < 1e-9);
    assert_eq!(session.scene().count_role(Role::SafeGuide), 1);
}

#[test]
fn test_close_disposes_engine() {
    let mut session = open_large();
    session.close();
    assert!(session.is_closed());
    assert!(session.engine().disposed);
    session.close();
}

#[tokio::test]
async fn test_upload_limits() {
    let config = EditorConfig {
        max_upload_bytes: 16,
        ..EditorConfig::default()
    };
    let mut session: EditorSession<HeadlessEngine> =
        EditorSession::open(three_inch(), config, HeadlessEngine::new(), 1200.0, 1200.0).unwrap();
    let uploader = MemoryAssetUploader::new();

    let too_big = session
        .upload_custom_shape(&uploader, vec![0; 17], "image/png")
        .await;
    assert!(matches!(too_big, Err(EditorError::ResourceLimit { size: 17, limit: 16 })));

    let wrong_type = session
        .upload_custom_shape(&uploader, vec![0; 4], "text/html")
        .await;
    assert!(matches!(wrong_type, Err(EditorError::UnsupportedMime(_))));
    assert!(uploader.is_empty());
    assert!(!session.shape_onboarding_complete());

    let url = session
        .upload_custom_shape(&uploader, vec![0; 4], "image/svg+xml")
        .await
        .unwrap();
    assert_eq!(session.custom_shape_url(), Some(url.as_str()));
    assert!(session.shape_onboarding_complete());
    assert_eq!(session.scene().count_role(Role::ShapeOutline), 1);
    assert_eq!(session.history().undo_len(), 0);
}

#[tokio::test]
async fn test_uploaded_image_fits_inside_safe_zone() {
    let mut session = open_large();
    let uploader = MemoryAssetUploader::new();
    let index = session
        .add_uploaded_image(&uploader, vec![1, 2, 3], "image/jpeg", 1650.0, 825.0)
        .await
        .unwrap();

    let image = session.scene().get(index).unwrap();
    assert_eq!((image.left, image.top), (37.5, 37.5));
    assert!((image.scale_x - 0.5).abs() < 1e-12);
    assert!((image.bounds().width - 825.0).abs() < 1e-9);
}

// =============================================================================
// Autosave through the session
// =============================================================================

fn store_with_design() -> Arc<MemoryDesignStore> {
    let store = MemoryDesignStore::new();
    store.insert(Design::new("design-1", "product-1")).unwrap();
    Arc::new(store)
}

#[tokio::test(start_paused = true)]
async fn test_autosave_debounces_mutations() {
    let store = store_with_design();
    let mut session = open_large().with_autosave("design-1", store.clone());

    for i in 0..5 {
        session
            .add_object(SceneObject::rect(i as f64, 0.0, 10.0, 10.0))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    assert_eq!(store.save_count(), 0);
    assert!(session.autosave_pending());

    tokio::time::sleep(Duration::from_secs(16)).await;
    tokio::task::yield_now().await;
    assert_eq!(store.save_count(), 1);

    let saved = store.get("design-1").unwrap().canvas_json;
    assert_eq!(saved.objects.len(), 5);
    assert!(saved.is_guide_free());
    assert!(matches!(
        session.poll_autosave_events().as_slice(),
        [AutosaveEvent::Saved { .. }]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_autosave() {
    let store = store_with_design();
    let mut session = open_large().with_autosave("design-1", store.clone());
    session.add_object(SceneObject::rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    drop(session);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_edits_after_close_do_not_autosave() {
    let store = store_with_design();
    let mut session = open_large().with_autosave("design-1", store.clone());
    session.close();
    let renders = session.engine().render_count;

    session.add_object(SceneObject::rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(!session.autosave_pending());
    assert_eq!(session.engine().render_count, renders);

    tokio::time::sleep(Duration::from_secs(30)).await;
    tokio::task::yield_now().await;
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_autosave_outside_runtime_is_skipped() {
    let store = store_with_design();
    let mut session = open_large().with_autosave("design-1", store.clone());
    session.add_object(SceneObject::rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(!session.autosave_pending());
    assert_eq!(session.scene().content_len(), 1);
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_save_now_leaves_timer_armed() {
    let store = store_with_design();
    let mut session = open_large().with_autosave("design-1", store.clone());
    session.add_object(SceneObject::rect(0.0, 0.0, 1.0, 1.0)).unwrap();

    session.save_now().await.unwrap();
    assert_eq!(store.save_count(), 1);
    assert!(session.autosave_pending());

    tokio::time::sleep(Duration::from_secs(20)).await;
    tokio::task::yield_now().await;
    assert_eq!(store.save_count(), 2);
}

#[tokio::test]
async fn test_save_now_without_store_fails() {
    let session = open_large();
    let err = session.save_now().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test(start_paused = true)]
async fn test_failed_autosave_is_reported() {
    let store = store_with_design();
    store.fail_next_save();
    let mut session = open_large().with_autosave("design-1", store.clone());
    session.set_background("#000000");

    tokio::time::sleep(Duration::from_secs(20)).await;
    tokio::task::yield_now().await;
    assert!(matches!(
        session.poll_autosave_events().as_slice(),
        [AutosaveEvent::Failed { .. }]
    ));
    assert_eq!(store.save_count(), 0);
}
