mod assets;
mod autosave;
mod config;
pub mod constants;
mod engine;
pub mod guides;
mod history;
mod print_spec;
mod scene;
mod session;
mod store;
mod template;
pub mod transform;
mod types;

pub use assets::{AssetUploader, MemoryAssetUploader, check_upload};
pub use autosave::{AutosaveEvent, AutosaveScheduler};
pub use config::EditorConfig;
pub use engine::{HeadlessEngine, RenderingEngine};
pub use guides::{GuideGeometry, StrippedGuides};
pub use history::History;
pub use print_spec::{PrintSpecification, ProductRecord};
pub use scene::*;
pub use session::EditorSession;
pub use store::{Design, DesignStore, FsDesignStore, MemoryDesignStore};
pub use template::{ApplyReport, Template, TemplatePayload, apply_template};
pub use transform::{DocumentScale, ViewportFit, to_document_points, to_screen_px};
pub use types::*;
