mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use cli::Cli;
use pfpdf::config::{
    CatalogOptions, ExtractionOptions, ModuleIdentity, PageRange, load_env_overrides,
};
use pfpdf::error::ImportResult;
use pfpdf::fvtt::{ModuleManifest, build_compendium_entries, build_scenes, write_catalog};
use pfpdf::ingestion::{PdfiumSource, create_pdfium, extract_images};

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error_code = e.error_code(), "Import failed");
            eprintln!("Error: {}", e.report());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ImportResult<()> {
    // Validate everything that can be checked before touching the document
    let page_range = cli.pages.as_deref().map(PageRange::parse).transpose()?;
    let overrides = load_env_overrides()?;

    let extraction_options = ExtractionOptions {
        use_metadata: !cli.no_metadata,
        include_text: cli.tags_from_text,
        page_range,
        ..Default::default()
    };

    let pdfium = create_pdfium()?;
    let source = PdfiumSource::open(&pdfium, &cli.pdf)?;
    let extraction = extract_images(&source, &cli.out, &extraction_options)?;

    let identity = ModuleIdentity::resolve(
        &cli.pdf,
        cli.module_id.as_deref(),
        cli.title.as_deref(),
        &overrides,
    );
    info!(
        module_id = %identity.module_id,
        title = %identity.title,
        "Resolved module identity"
    );

    let catalog_options = CatalogOptions {
        tags_from_text: cli.tags_from_text,
        note: cli.note.clone(),
        module_id: Some(identity.module_id.clone()),
        title: Some(identity.title.clone()),
        image_dir: cli.image_dir.clone(),
        grid_size: cli.grid_size,
    };

    let entries = build_compendium_entries(&extraction.images, &catalog_options);
    let scenes = build_scenes(&extraction.images, &catalog_options);
    let files = write_catalog(
        &cli.out,
        &entries,
        &scenes,
        &ModuleManifest::new(&identity),
    )?;

    println!(
        "Extracted {} images. Compendium saved to {}",
        extraction.images.len(),
        files.pack.display()
    );

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pfpdf=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
