//! PDF rendering for exported pages
//!
//! Page geometry and boxes, scene objects as drawing operators, raster
//! embedding and the per-page resource dictionary.

mod objects;
mod page;
mod raster;
mod resources;

pub use objects::{DrawContext, draw_objects, ellipse_path, escape_text};
pub use page::{page_layout, render_page};
pub use raster::{add_image_xobject, decode_data_url, raster_bytes};
pub use resources::{PageResources, helvetica};
