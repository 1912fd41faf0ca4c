use super::objects::{DrawContext, draw_objects};
use super::raster::{add_image_xobject, raster_bytes};
use super::resources::{PageResources, helvetica};
use crate::color::{Rgba, num, parse_color};
use crate::constants::POINTS_PER_INCH;
use crate::marks::generate_marks;
use crate::options::ExportOptions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use sticker_editor::{DocumentScale, PrintSpecification, SceneObject};

/// Page geometry for one product: the bleed box sits inside a blank margin
/// that holds the crop marks.
pub fn page_layout(spec: &PrintSpecification, options: &ExportOptions) -> PageLayout {
    let margin = options.crop_mark_margin_pt;
    let bleed_box = PdfRect::new(
        margin,
        margin,
        spec.bleed_width_pt(),
        spec.bleed_height_pt(),
    );
    let trim_box = bleed_box.inset(spec.bleed_in * POINTS_PER_INCH);
    let safe_box = trim_box.inset(spec.safe_zone_in * POINTS_PER_INCH);

    PageLayout {
        width_pt: bleed_box.width + 2.0 * margin,
        height_pt: bleed_box.height + 2.0 * margin,
        bleed_box,
        trim_box,
        safe_box,
    }
}

/// Render one design onto a new page of `doc`. The Helvetica font object is
/// created on first use and shared through `font_id`.
pub fn render_page(
    doc: &mut Document,
    page: &ExportPage,
    options: &ExportOptions,
    parent_id: ObjectId,
    font_id: &mut Option<ObjectId>,
) -> Result<(ObjectId, PageLayout)> {
    let layout = page_layout(&page.spec, options);
    let mut resources = PageResources::default();
    let mut content = String::new();

    // Background covers trim and bleed
    let background = parse_color(&page.snapshot.background).unwrap_or_else(|| {
        log::debug!(
            "Unrecognised background `{}`, using white",
            page.snapshot.background
        );
        Rgba::WHITE
    });
    let bleed = &layout.bleed_box;
    if !background.is_invisible() {
        content.push_str("q\n");
        content.push_str(&background.fill_op());
        content.push_str(&format!(
            "{} {} {} {} re f\nQ\n",
            num(bleed.x),
            num(bleed.y),
            num(bleed.width),
            num(bleed.height)
        ));
    }

    // Artwork never spills into the mark margin
    content.push_str("q\n");
    content.push_str(&format!(
        "{} {} {} {} re W n\n",
        num(bleed.x),
        num(bleed.y),
        num(bleed.width),
        num(bleed.height)
    ));

    match &page.raster {
        Some(source) => {
            let bytes = raster_bytes(source)?;
            let (image_id, _, _) = add_image_xobject(doc, &bytes)?;
            let name = resources.add_xobject(image_id);
            // The raster is the editor canvas, which spans the trim box
            let trim = &layout.trim_box;
            content.push_str(&format!(
                "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
                num(trim.width),
                num(trim.height),
                num(trim.x),
                num(trim.y),
                name
            ));
        }
        None => {
            let objects = printable_objects(&page.snapshot.objects);
            let ctx = DrawContext {
                scale: DocumentScale::for_canvas(&page.spec, page.snapshot.canvas_width),
                trim: layout.trim_box,
            };
            content.push_str(&draw_objects(&objects, &ctx, &mut resources));
        }
    }
    content.push_str("Q\n");

    content.push_str(&generate_marks(&layout, options));

    if resources.uses_font && font_id.is_none() {
        *font_id = Some(doc.add_object(helvetica()));
    }

    let mut stream = Stream::new(Dictionary::new(), content.into_bytes());
    stream.compress()?;
    let content_id = doc.add_object(stream);

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.width_pt as f32),
            Object::Real(layout.height_pt as f32),
        ]),
    );
    page_dict.set("BleedBox", page_box(&layout.bleed_box));
    page_dict.set("TrimBox", page_box(&layout.trim_box));
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set(
        "Resources",
        Object::Dictionary(resources.into_dictionary(*font_id)),
    );

    let page_id = doc.add_object(page_dict);
    Ok((page_id, layout))
}

/// Overlay objects have no business in print output; drop any that slipped
/// through.
fn printable_objects(objects: &[SceneObject]) -> Vec<SceneObject> {
    let (overlays, printable): (Vec<&SceneObject>, Vec<&SceneObject>) =
        objects.iter().partition(|o| o.role.is_overlay());
    for overlay in &overlays {
        log::warn!(
            "Dropping {:?} object from export; snapshots should be guide-free",
            overlay.role
        );
    }
    printable.into_iter().cloned().collect()
}

fn page_box(rect: &PdfRect) -> Object {
    Object::Array(
        rect.to_box()
            .iter()
            .map(|v| Object::Real(*v as f32))
            .collect(),
    )
}
