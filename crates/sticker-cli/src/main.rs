use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sticker_editor::guides::{bleed_inset_px, safe_inset_px};
use sticker_editor::{
    DesignStore, DocumentScale, EditorConfig, EditorSession, FsDesignStore, HeadlessEngine,
    PrintSpecification, ViewportFit,
};
use sticker_prepress::{ExportOptions, ExportPage, RasterSource};

#[derive(Parser)]
#[command(name = "stkr", about = "Sticker design and prepress tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print a product's print specification
    Spec {
        #[command(flatten)]
        product: ProductArgs,
    },

    /// Show how the print area fits a viewport, with guide insets
    Fit {
        #[command(flatten)]
        product: ProductArgs,

        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// Apply a template to a stored design and save it
    ApplyTemplate {
        /// Directory holding one JSON file per design
        #[arg(short, long)]
        store: PathBuf,

        /// Design id
        #[arg(short, long)]
        design: String,

        /// Template JSON file (a template record or its canvas JSON)
        #[arg(short, long)]
        template: PathBuf,

        #[command(flatten)]
        product: ProductArgs,

        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// Export stored designs to a print-ready PDF, one page each
    Export {
        /// Directory holding one JSON file per design
        #[arg(short, long)]
        store: PathBuf,

        /// Design id(s)
        #[arg(short, long, required = true, num_args = 1..)]
        design: Vec<String>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        product: ProductArgs,

        /// Flattened PNG or JPEG to place instead of the vector objects
        /// (single design only)
        #[arg(long)]
        raster: Option<PathBuf>,

        /// Export options JSON file
        #[arg(long)]
        options: Option<PathBuf>,

        /// Leave out the dashed safe-zone line
        #[arg(long)]
        no_safe_zone: bool,

        /// Leave out the solid trim line
        #[arg(long)]
        no_trim_line: bool,

        /// Document title
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Args)]
struct ProductArgs {
    /// Product record JSON (printWidth, printHeight, printDpi, bleedSize,
    /// safeZone); overrides the flags below
    #[arg(long)]
    product: Option<PathBuf>,

    /// Trim width in inches
    #[arg(long, default_value = "3.0")]
    width_in: f64,

    /// Trim height in inches
    #[arg(long, default_value = "3.0")]
    height_in: f64,

    /// Print resolution
    #[arg(long, default_value = "300")]
    dpi: u32,

    /// Bleed in inches
    #[arg(long, default_value = "0.125")]
    bleed_in: f64,

    /// Safe zone in inches
    #[arg(long, default_value = "0.125")]
    safe_in: f64,
}

impl ProductArgs {
    async fn resolve(&self) -> Result<PrintSpecification> {
        match &self.product {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                Ok(PrintSpecification::from_json(&json))
            }
            None => Ok(PrintSpecification::new(
                self.width_in,
                self.height_in,
                self.dpi,
                self.bleed_in,
                self.safe_in,
            )?),
        }
    }
}

#[derive(Args)]
struct ViewportArgs {
    /// Editor container width in pixels
    #[arg(long, default_value = "800")]
    container_width: f64,

    /// Editor container height in pixels
    #[arg(long, default_value = "600")]
    container_height: f64,

    /// Editor configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ViewportArgs {
    async fn config(&self) -> Result<EditorConfig> {
        Ok(match &self.config {
            Some(path) => EditorConfig::load(path).await?,
            None => EditorConfig::default(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spec { product } => {
            let spec = product.resolve().await?;
            println!("Print specification:");
            println!(
                "  Trim: {}in × {}in at {} DPI",
                spec.print_width_in, spec.print_height_in, spec.print_dpi
            );
            println!("  Bleed: {}in  Safe zone: {}in", spec.bleed_in, spec.safe_zone_in);
            println!(
                "  Print pixels: {} × {}",
                spec.print_width_px(),
                spec.print_height_px()
            );
            println!(
                "  Trim box: {}pt × {}pt  Bleed box: {}pt × {}pt",
                spec.trim_width_pt(),
                spec.trim_height_pt(),
                spec.bleed_width_pt(),
                spec.bleed_height_pt()
            );
        }

        Commands::Fit { product, viewport } => {
            let spec = product.resolve().await?;
            let config = viewport.config().await?;
            let fit = ViewportFit::compute_with(
                &spec,
                viewport.container_width,
                viewport.container_height,
                config.viewport_padding_px,
                config.min_fit_scale,
            );
            let scale = DocumentScale::for_canvas(&spec, Some(fit.display_width_px));
            println!("Viewport fit:");
            println!("  Fit scale: {:.6}", fit.fit_scale);
            println!(
                "  Canvas: {:.2} × {:.2} px",
                fit.display_width_px, fit.display_height_px
            );
            println!("  Bleed guide inset: {:.2} px", bleed_inset_px(&spec, &fit));
            println!("  Safe guide inset: {:.2} px", safe_inset_px(&spec, &fit));
            println!("  Points per pixel: {:.6}", scale.points_per_px);
        }

        Commands::ApplyTemplate {
            store,
            design,
            template,
            product,
            viewport,
        } => {
            let spec = product.resolve().await?;
            let config = viewport.config().await?;
            let store = Arc::new(FsDesignStore::new(&store));
            let record = store.load_design(&design).await?;
            let template_json = tokio::fs::read_to_string(&template)
                .await
                .with_context(|| format!("reading {}", template.display()))?;

            let mut session = EditorSession::open_design(
                spec,
                config,
                HeadlessEngine::default(),
                viewport.container_width,
                viewport.container_height,
                &record,
            )?
            .with_autosave(design.clone(), Arc::clone(&store));

            let report = session.apply_template_json(&template_json)?;
            session.save_now().await?;
            session.close();

            println!(
                "Applied template to {}: {} object(s) inserted",
                design, report.inserted
            );
            if report.dropped_guides > 0 {
                println!("  Discarded {} guide object(s) from the template", report.dropped_guides);
            }
        }

        Commands::Export {
            store,
            design,
            output,
            product,
            raster,
            options,
            no_safe_zone,
            no_trim_line,
            title,
        } => {
            let spec = product.resolve().await?;
            let mut options = match options {
                Some(path) => ExportOptions::load(&path).await?,
                None => ExportOptions::default(),
            };
            options.draw_safe_zone &= !no_safe_zone;
            options.draw_trim_line &= !no_trim_line;
            if title.is_some() {
                options.title = title;
            }

            if raster.is_some() && design.len() != 1 {
                bail!("--raster can only be used with a single design");
            }

            let store = FsDesignStore::new(&store);
            let mut pages = Vec::with_capacity(design.len());
            for id in &design {
                let record = store.load_design(id).await?;
                pages.push(ExportPage::new(spec, record.canvas_json.without_overlays()));
            }
            if let Some(path) = &raster {
                let bytes = read_bytes(path).await?;
                if let Some(page) = pages.first_mut() {
                    page.raster = Some(RasterSource::Bytes(bytes));
                }
            }

            let exported = sticker_prepress::export_design(pages, options).await?;
            for (id, layout) in design.iter().zip(&exported.layouts) {
                println!(
                    "  {}: page {:.2}pt × {:.2}pt, trim {:?}",
                    id, layout.width_pt, layout.height_pt, layout.trim_box.to_box()
                );
            }
            sticker_prepress::save_pdf(exported.document, &output).await?;
            println!("Exported {} design(s) → {}", design.len(), output.display());
        }
    }

    Ok(())
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
