use std::path::PathBuf;

mod handlers;
mod worker;

// Re-export types from library crates
pub use sticker_editor::{Design, DesignStore, PrintSpecification, SceneSnapshot};
pub use sticker_prepress::{ExportOptions, ExportPage, PageLayout, RasterSource};
pub use worker::worker_task;

/// Commands sent from a front end to the export worker
#[derive(Debug)]
pub enum PrepressCommand {
    /// Export pages that are already in hand
    Export {
        job: JobId,
        pages: Vec<ExportPage>,
        options: ExportOptions,
        output_path: PathBuf,
    },
    /// Load a saved design from the store and export it
    ExportStored {
        job: JobId,
        design_id: String,
        spec: PrintSpecification,
        options: ExportOptions,
        output_path: PathBuf,
    },
    LoadOptions {
        path: PathBuf,
    },
}

/// Updates sent from the worker back to the front end
#[derive(Debug, Clone)]
pub enum PrepressUpdate {
    Started {
        job: JobId,
    },
    ExportComplete {
        job: JobId,
        path: PathBuf,
        layouts: Vec<PageLayout>,
    },
    OptionsLoaded {
        options: ExportOptions,
    },
    Error {
        job: Option<JobId>,
        message: String,
    },
}

/// Caller-chosen handle tying updates to the command that caused them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub u64);
