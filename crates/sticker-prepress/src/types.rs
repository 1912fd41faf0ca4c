use sticker_editor::{PrintSpecification, SceneSnapshot};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepressError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid raster: {0}")]
    Raster(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to export")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, PrepressError>;

/// Axis-aligned rectangle in document points, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }

    /// `[llx lly urx ury]` for page boxes
    pub fn to_box(&self) -> [f64; 4] {
        [self.x, self.y, self.right(), self.top()]
    }
}

/// What a flattened canvas raster is made of
#[derive(Debug, Clone, PartialEq)]
pub enum RasterSource {
    /// Encoded PNG or JPEG bytes
    Bytes(Vec<u8>),
    /// A `data:image/...;base64,` URL as produced by the rendering engine
    DataUrl(String),
}

/// One design to place on its own page
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPage {
    pub spec: PrintSpecification,
    pub snapshot: SceneSnapshot,
    /// When present, drawn instead of the individual scene objects
    pub raster: Option<RasterSource>,
}

impl ExportPage {
    pub fn new(spec: PrintSpecification, snapshot: SceneSnapshot) -> Self {
        Self {
            spec,
            snapshot,
            raster: None,
        }
    }

    pub fn with_raster(mut self, raster: RasterSource) -> Self {
        self.raster = Some(raster);
        self
    }
}

/// Geometry of one exported page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_pt: f64,
    pub height_pt: f64,
    /// Trim plus bleed
    pub bleed_box: PdfRect,
    /// Finished product edge
    pub trim_box: PdfRect,
    /// Area guaranteed not to be cut
    pub safe_box: PdfRect,
}

/// Output of an export run
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub document: lopdf::Document,
    pub layouts: Vec<PageLayout>,
}
