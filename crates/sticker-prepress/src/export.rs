use crate::constants::{PDF_VERSION, PRODUCER};
use crate::options::ExportOptions;
use crate::render::render_page;
use crate::types::*;
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

/// Export designs to a print-ready PDF, one page per design
pub async fn export_design(
    pages: Vec<ExportPage>,
    options: ExportOptions,
) -> Result<ExportedDocument> {
    options.validate()?;
    tokio::task::spawn_blocking(move || export_pdf(&pages, &options)).await?
}

/// Synchronous export. Each page gets its own bleed, trim and media boxes,
/// so products of different sizes can share one file.
pub fn export_pdf(pages: &[ExportPage], options: &ExportOptions) -> Result<ExportedDocument> {
    options.validate()?;
    if pages.is_empty() {
        return Err(PrepressError::NoPages);
    }

    let mut output = Document::with_version(PDF_VERSION);
    let pages_id = output.new_object_id();
    let mut font_id = None;
    let mut page_refs = Vec::with_capacity(pages.len());
    let mut layouts = Vec::with_capacity(pages.len());

    for (index, page) in pages.iter().enumerate() {
        let (page_id, layout) = render_page(&mut output, page, options, pages_id, &mut font_id)?;
        log::debug!(
            "Page {}: {}x{}pt, trim {:?}",
            index + 1,
            layout.width_pt,
            layout.height_pt,
            layout.trim_box.to_box()
        );
        page_refs.push(Object::Reference(page_id));
        layouts.push(layout);
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let mut info = Dictionary::new();
    info.set("Producer", Object::string_literal(PRODUCER));
    if let Some(title) = &options.title {
        info.set("Title", Object::string_literal(title.as_str()));
    }
    let info_id = output.add_object(info);
    output.trailer.set("Info", info_id);

    log::info!("Exported {} page(s)", layouts.len());
    Ok(ExportedDocument {
        document: output,
        layouts,
    })
}

/// Serialize a document to bytes
pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Save an exported document
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || to_bytes(&mut doc)).await??;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
