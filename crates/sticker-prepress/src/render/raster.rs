//! Flattened canvas rasters as image XObjects

use crate::types::{PrepressError, RasterSource, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Encoded image bytes behind a raster source
pub fn raster_bytes(source: &RasterSource) -> Result<Vec<u8>> {
    match source {
        RasterSource::Bytes(bytes) => Ok(bytes.clone()),
        RasterSource::DataUrl(url) => decode_data_url(url),
    }
}

/// Decode a base64 `data:` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PrepressError::Raster("not a data: URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PrepressError::Raster("data: URL has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(PrepressError::Raster(format!(
            "data: URL `{header}` is not base64 encoded"
        )));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PrepressError::Raster(format!("invalid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(PrepressError::Raster("data: URL is empty".to_string()));
    }
    Ok(bytes)
}

/// Decode an encoded raster and add it to `doc` as an RGB image XObject.
/// Alpha, when present, becomes a soft mask. Returns the object id and the
/// pixel size.
pub fn add_image_xobject(doc: &mut Document, bytes: &[u8]) -> Result<(ObjectId, u32, u32)> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(PrepressError::Raster("raster has no pixels".to_string()));
    }

    let smask = if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mut mask = Stream::new(image_dict(width, height, b"DeviceGray"), alpha);
        mask.compress()?;
        Some(doc.add_object(mask))
    } else {
        None
    };

    let mut dict = image_dict(width, height, b"DeviceRGB");
    if let Some(mask_id) = smask {
        dict.set("SMask", Object::Reference(mask_id));
    }
    let mut stream = Stream::new(dict, decoded.to_rgb8().into_raw());
    stream.compress()?;

    log::debug!("Embedded {}×{} raster", width, height);
    Ok((doc.add_object(stream), width, height))
}

fn image_dict(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}
