pub mod color;
pub mod constants;
pub mod export;
pub mod marks;
mod options;
pub mod render;
mod types;

pub use color::{Rgba, parse_color};
pub use export::{export_design, export_pdf, save_pdf, to_bytes};
pub use marks::{crop_mark_segments, generate_marks};
pub use options::*;
pub use render::page_layout;
pub use types::*;
