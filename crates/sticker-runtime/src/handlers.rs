use crate::{JobId, PrepressUpdate};
use std::path::PathBuf;
use std::sync::Arc;
use sticker_editor::{DesignStore, PrintSpecification};
use sticker_prepress::{ExportOptions, ExportPage, RasterSource, export_design, save_pdf};
use tokio::sync::mpsc;

pub async fn handle_export(
    job: JobId,
    pages: Vec<ExportPage>,
    options: ExportOptions,
    output_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<PrepressUpdate>,
) {
    let _ = update_tx.send(PrepressUpdate::Started { job });

    let exported = match export_design(pages, options).await {
        Ok(exported) => exported,
        Err(e) => {
            let _ = update_tx.send(PrepressUpdate::Error {
                job: Some(job),
                message: format!("Failed to export: {e}"),
            });
            return;
        }
    };

    let layouts = exported.layouts;
    match save_pdf(exported.document, &output_path).await {
        Ok(()) => {
            log::info!("Job {} wrote {}", job.0, output_path.display());
            let _ = update_tx.send(PrepressUpdate::ExportComplete {
                job,
                path: output_path,
                layouts,
            });
        }
        Err(e) => {
            let _ = update_tx.send(PrepressUpdate::Error {
                job: Some(job),
                message: format!("Failed to save PDF: {e}"),
            });
        }
    }
}

pub async fn handle_export_stored<S: DesignStore>(
    job: JobId,
    store: Arc<S>,
    design_id: String,
    spec: PrintSpecification,
    options: ExportOptions,
    output_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<PrepressUpdate>,
) {
    let design = match store.load_design(&design_id).await {
        Ok(design) => design,
        Err(e) => {
            let _ = update_tx.send(PrepressUpdate::Error {
                job: Some(job),
                message: format!("Failed to load design {design_id}: {e}"),
            });
            return;
        }
    };

    let mut snapshot = design.canvas_json;
    if !snapshot.is_guide_free() {
        log::debug!("Stripping overlays from stored design {}", design_id);
        snapshot = snapshot.without_overlays();
    }

    let mut page = ExportPage::new(spec, snapshot);
    // A flattened export already stored with the design takes precedence
    if let Some(url) = design
        .high_res_export_url
        .filter(|url| url.starts_with("data:"))
    {
        page = page.with_raster(RasterSource::DataUrl(url));
    }

    handle_export(job, vec![page], options, output_path, update_tx).await;
}

pub async fn handle_load_options(path: PathBuf, update_tx: &mpsc::UnboundedSender<PrepressUpdate>) {
    match ExportOptions::load(&path).await {
        Ok(options) => {
            let _ = update_tx.send(PrepressUpdate::OptionsLoaded { options });
        }
        Err(e) => {
            let _ = update_tx.send(PrepressUpdate::Error {
                job: None,
                message: format!("Failed to load export options: {e}"),
            });
        }
    }
}
