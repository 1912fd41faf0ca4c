use crate::{PrepressCommand, PrepressUpdate, handlers};
use std::sync::Arc;
use sticker_editor::DesignStore;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Async worker task that runs export commands and sends updates.
///
/// Every export runs on its own task so large designs do not hold up the
/// queue. Once the command channel closes, in-flight exports are allowed to
/// finish before the worker returns.
pub async fn worker_task<S: DesignStore>(
    store: Arc<S>,
    mut command_rx: mpsc::UnboundedReceiver<PrepressCommand>,
    update_tx: mpsc::UnboundedSender<PrepressUpdate>,
) {
    let mut in_flight = JoinSet::new();

    while let Some(cmd) = command_rx.recv().await {
        // Reap whatever already finished
        while in_flight.try_join_next().is_some() {}

        let update_tx = update_tx.clone();
        match cmd {
            PrepressCommand::Export {
                job,
                pages,
                options,
                output_path,
            } => {
                log::debug!("Job {}: exporting {} page(s)", job.0, pages.len());
                in_flight.spawn(async move {
                    handlers::handle_export(job, pages, options, output_path, &update_tx).await;
                });
            }
            PrepressCommand::ExportStored {
                job,
                design_id,
                spec,
                options,
                output_path,
            } => {
                log::debug!("Job {}: exporting stored design {}", job.0, design_id);
                let store = Arc::clone(&store);
                in_flight.spawn(async move {
                    handlers::handle_export_stored(
                        job,
                        store,
                        design_id,
                        spec,
                        options,
                        output_path,
                        &update_tx,
                    )
                    .await;
                });
            }
            PrepressCommand::LoadOptions { path } => {
                handlers::handle_load_options(path, &update_tx).await;
            }
        }
    }

    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            log::error!("Export task failed: {}", e);
        }
    }
    log::debug!("Export worker stopped");
}
