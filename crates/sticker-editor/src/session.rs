//! Editor session
//!
//! One open design: the live scene, its viewport fit, history, the pending
//! autosave and the injected rendering engine. Every mutating operation runs
//! to completion (history, guides, z-order) before the engine is asked to
//! render.

use crate::assets::{AssetUploader, check_upload};
use crate::autosave::{AutosaveEvent, AutosaveScheduler};
use crate::config::EditorConfig;
use crate::engine::RenderingEngine;
use crate::guides;
use crate::history::History;
use crate::print_spec::PrintSpecification;
use crate::scene::{GuidePolicy, Role, Scene, SceneObject, SceneSnapshot};
use crate::store::{Design, DesignStore, MemoryDesignStore};
use crate::template::{self, ApplyReport, TemplatePayload};
use crate::transform::{ViewportFit, to_screen_px};
use crate::types::{EditorError, Result};
use std::sync::Arc;

pub struct EditorSession<E: RenderingEngine, S: DesignStore = MemoryDesignStore> {
    design_id: Option<String>,
    spec: PrintSpecification,
    config: EditorConfig,
    fit: ViewportFit,
    scene: Scene,
    history: History,
    autosave: Option<AutosaveScheduler<S>>,
    engine: E,
    shape_onboarding_complete: bool,
    custom_shape_url: Option<String>,
    closed: bool,
}

impl<E: RenderingEngine, S: DesignStore> EditorSession<E, S> {
    /// Open an empty scene fitted into a `container_w × container_h` area
    pub fn open(
        spec: PrintSpecification,
        config: EditorConfig,
        engine: E,
        container_w: f64,
        container_h: f64,
    ) -> Result<Self> {
        config.validate()?;
        let fit = ViewportFit::compute_with(
            &spec,
            container_w,
            container_h,
            config.viewport_padding_px,
            config.min_fit_scale,
        );

        let mut scene = Scene::default();
        guides::install(&mut scene, &spec, &fit);

        let mut session = Self {
            design_id: None,
            history: History::new(config.history_limit),
            spec,
            config,
            fit,
            scene,
            autosave: None,
            engine,
            shape_onboarding_complete: false,
            custom_shape_url: None,
            closed: false,
        };
        log::debug!(
            "Opened session at fit {:.4} ({:.1} × {:.1} px)",
            fit.fit_scale,
            fit.display_width_px,
            fit.display_height_px
        );
        session.render();
        Ok(session)
    }

    /// Open a persisted design. Stray guide objects in the stored canvas are
    /// discarded and replaced by freshly computed guides.
    pub fn open_design(
        spec: PrintSpecification,
        config: EditorConfig,
        engine: E,
        container_w: f64,
        container_h: f64,
        design: &Design,
    ) -> Result<Self> {
        let mut session = Self::open(spec, config, engine, container_w, container_h)?;
        session.design_id = Some(design.id.clone());

        let stored = &design.canvas_json;
        if !stored.is_guide_free() {
            log::warn!(
                "Design {} was stored with guide objects; discarding them",
                design.id
            );
        }
        let content = stored.without_overlays().rescaled_to(
            &session.spec,
            session.fit.display_width_px,
            session.fit.display_height_px,
        );
        session.scene.replace_content(content.objects);
        session.scene.set_background(content.background);

        if let Some(url) = &design.custom_shape_url {
            guides::add_shape_outline(&mut session.scene, url, &session.fit);
            session.custom_shape_url = Some(url.clone());
            session.shape_onboarding_complete = true;
        }
        guides::pin(&mut session.scene);
        session.render();
        Ok(session)
    }

    /// Persist every committed mutation through `store` after the configured
    /// debounce delay.
    pub fn with_autosave(mut self, design_id: impl Into<String>, store: Arc<S>) -> Self {
        let design_id = design_id.into();
        self.autosave = Some(AutosaveScheduler::new(
            store,
            design_id.clone(),
            self.config.autosave_delay(),
        ));
        self.design_id = Some(design_id);
        self
    }

    // -------------------------------------------------------------------------
    // Content mutations
    // -------------------------------------------------------------------------

    /// Add a content object on top of the existing content. Returns its index.
    pub fn add_object(&mut self, object: SceneObject) -> Result<usize> {
        if object.role.is_overlay() {
            return Err(EditorError::MalformedSnapshot(format!(
                "{:?} objects are managed by the editor and cannot be added",
                object.role
            )));
        }
        self.checkpoint();
        self.scene.add(object);
        guides::pin(&mut self.scene);
        self.commit();
        self.last_content_index()
            .ok_or_else(|| EditorError::NotFound("added object".to_string()))
    }

    /// Mutate a content object in place
    pub fn modify_object(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut SceneObject),
    ) -> Result<()> {
        self.content_at(index)?;
        self.checkpoint();
        if let Some(object) = self.scene.get_mut(index) {
            edit(object);
            object.role = Role::Content;
        }
        guides::pin(&mut self.scene);
        self.commit();
        Ok(())
    }

    pub fn remove_object(&mut self, index: usize) -> Result<SceneObject> {
        self.content_at(index)?;
        self.checkpoint();
        let removed = self
            .scene
            .remove(index)
            .ok_or_else(|| EditorError::NotFound(format!("object {index}")))?;
        self.commit();
        Ok(removed)
    }

    /// Reorder content. Overlays keep their pinned positions.
    pub fn move_object(&mut self, from: usize, to: usize) -> Result<()> {
        self.content_at(from)?;
        self.checkpoint();
        self.scene.move_to(from, to);
        guides::pin(&mut self.scene);
        self.commit();
        Ok(())
    }

    pub fn set_background(&mut self, background: impl Into<String>) {
        self.checkpoint();
        self.scene.set_background(background);
        self.commit();
    }

    /// Replace all content with a template given as JSON text. Nothing is
    /// changed when the template fails to parse.
    pub fn apply_template_json(&mut self, json: &str) -> Result<ApplyReport> {
        let payload = TemplatePayload::parse(json)?;
        Ok(self.apply_template(&payload))
    }

    pub fn apply_template(&mut self, payload: &TemplatePayload) -> ApplyReport {
        let report = template::apply_template(
            &mut self.scene,
            &mut self.history,
            payload,
            &self.spec,
            &self.fit,
        );
        self.commit();
        report
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, state: SceneSnapshot) {
        let state = state.rescaled_to(
            &self.spec,
            self.fit.display_width_px,
            self.fit.display_height_px,
        );
        self.scene.replace_content(state.objects);
        self.scene.set_background(state.background);
        guides::ensure(&mut self.scene, &self.spec, &self.fit);
        guides::pin(&mut self.scene);
        self.commit();
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Refit after the on-screen container was resized
    pub fn set_container_size(&mut self, container_w: f64, container_h: f64) {
        let fit = ViewportFit::compute_with(
            &self.spec,
            container_w,
            container_h,
            self.config.viewport_padding_px,
            self.config.min_fit_scale,
        );
        self.apply_fit(fit);
    }

    /// Explicit zoom level
    pub fn set_zoom(&mut self, fit_scale: f64) {
        let fit = ViewportFit::with_scale(&self.spec, fit_scale.max(self.config.min_fit_scale));
        self.apply_fit(fit);
    }

    /// Content is rescaled, guides are recomputed from inches. Not an undoable
    /// change.
    fn apply_fit(&mut self, fit: ViewportFit) {
        let factor = fit.display_width_px / self.fit.display_width_px;
        if factor.is_finite() && (factor - 1.0).abs() > f64::EPSILON {
            self.scene.rescale_content(factor);
        }
        self.fit = fit;
        guides::recompute(&mut self.scene, &self.spec, &self.fit);
        log::debug!("Viewport refit to {:.4}", fit.fit_scale);
        self.render();
    }

    // -------------------------------------------------------------------------
    // Custom shapes and uploads
    // -------------------------------------------------------------------------

    /// Show a die-cut outline behind the content. Overlay-only, so no
    /// history entry.
    pub fn set_custom_shape(&mut self, url: impl Into<String>) {
        let url = url.into();
        guides::add_shape_outline(&mut self.scene, &url, &self.fit);
        self.custom_shape_url = Some(url);
        self.shape_onboarding_complete = true;
        self.render();
    }

    pub async fn upload_custom_shape<U: AssetUploader>(
        &mut self,
        uploader: &U,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String> {
        check_upload(bytes.len(), mime, self.config.max_upload_bytes)?;
        let url = uploader.upload(bytes, mime).await?;
        log::info!("Uploaded custom shape to {}", url);
        self.set_custom_shape(url.clone());
        Ok(url)
    }

    /// Upload an image and place it inside the safe zone, scaled down to fit
    /// if needed. `width` and `height` are the image's pixel size.
    pub async fn add_uploaded_image<U: AssetUploader>(
        &mut self,
        uploader: &U,
        bytes: Vec<u8>,
        mime: &str,
        width: f64,
        height: f64,
    ) -> Result<usize> {
        check_upload(bytes.len(), mime, self.config.max_upload_bytes)?;
        let url = uploader.upload(bytes, mime).await?;

        let inset = to_screen_px(self.spec.safe_zone_in, &self.spec, self.fit.fit_scale);
        let room_w = self.fit.display_width_px - 2.0 * inset;
        let room_h = self.fit.display_height_px - 2.0 * inset;
        let scale = (room_w / width).min(room_h / height).min(1.0);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        self.add_object(SceneObject::image(inset, inset, width, height, url).with_scale(scale, scale))
    }

    /// Mark the first-time custom shape prompt as dealt with
    pub fn complete_shape_onboarding(&mut self) {
        self.shape_onboarding_complete = true;
    }

    // -------------------------------------------------------------------------
    // Export and persistence
    // -------------------------------------------------------------------------

    /// Flatten the content to a raster. Guides are removed from the scene for
    /// the duration of the export and put back afterwards, even on failure.
    pub fn export_raster(&mut self, multiplier: f64) -> Result<String> {
        let stripped = guides::strip(&mut self.scene);
        let snapshot = self.snapshot();
        let result = self.engine.export_raster(&snapshot, multiplier);
        guides::restore(&mut self.scene, stripped);
        guides::ensure(&mut self.scene, &self.spec, &self.fit);
        self.render();
        result
    }

    /// Content-only snapshot tagged with the current display size
    pub fn snapshot(&self) -> SceneSnapshot {
        self.scene.to_snapshot(
            GuidePolicy::Exclude,
            Some((self.fit.display_width_px, self.fit.display_height_px)),
        )
    }

    /// Write the current state straight to the store. The autosave timer is
    /// left as it is.
    pub async fn save_now(&self) -> Result<()> {
        let autosave = self.autosave.as_ref().ok_or_else(|| {
            EditorError::Persistence("session has no design store attached".to_string())
        })?;
        let snapshot = self.snapshot();
        autosave
            .store()
            .save_snapshot(autosave.design_id(), &snapshot)
            .await?;
        log::info!("Saved design {}", autosave.design_id());
        Ok(())
    }

    /// Autosave outcomes reported since the last poll
    pub fn poll_autosave_events(&mut self) -> Vec<AutosaveEvent> {
        self.autosave
            .as_mut()
            .map(|a| a.drain_events())
            .unwrap_or_default()
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.as_ref().is_some_and(|a| a.is_pending())
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Cancel the pending autosave and release the engine. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.cancel();
        }
        self.engine.dispose();
        self.closed = true;
        log::debug!("Closed session");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn design_id(&self) -> Option<&str> {
        self.design_id.as_deref()
    }

    pub fn spec(&self) -> &PrintSpecification {
        &self.spec
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn fit(&self) -> &ViewportFit {
        &self.fit
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn custom_shape_url(&self) -> Option<&str> {
        self.custom_shape_url.as_deref()
    }

    pub fn shape_onboarding_complete(&self) -> bool {
        self.shape_onboarding_complete
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn checkpoint(&mut self) {
        let before = self.snapshot();
        self.history.checkpoint(before);
    }

    fn commit(&mut self) {
        if self.closed {
            return;
        }
        self.render();
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.schedule(self.scene.to_snapshot(
                GuidePolicy::Exclude,
                Some((self.fit.display_width_px, self.fit.display_height_px)),
            ));
        }
    }

    fn render(&mut self) {
        if !self.closed {
            self.engine
                .render(self.scene.objects(), self.scene.background());
        }
    }

    fn content_at(&self, index: usize) -> Result<&SceneObject> {
        self.scene
            .get(index)
            .filter(|o| o.role == Role::Content)
            .ok_or_else(|| EditorError::NotFound(format!("content object at index {index}")))
    }

    fn last_content_index(&self) -> Option<usize> {
        self.scene
            .objects()
            .iter()
            .rposition(|o| o.role == Role::Content)
    }
}

impl<E: RenderingEngine, S: DesignStore> Drop for EditorSession<E, S> {
    fn drop(&mut self) {
        self.close();
    }
}
