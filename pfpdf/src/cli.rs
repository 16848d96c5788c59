use std::path::PathBuf;

use clap::Parser;

use pfpdf::config::DEFAULT_GRID_SIZE;

/// Extract images from a PDF and prepare a Foundry VTT compendium.
#[derive(Debug, Parser)]
#[command(name = "pfpdf", about, version)]
pub struct Cli {
    /// Path to the source PDF file
    #[arg(value_name = "PDF")]
    pub pdf: PathBuf,

    /// Directory to store extracted images and JSON
    #[arg(value_name = "OUT")]
    pub out: PathBuf,

    /// Use fallback names and ignore bookmarks for hierarchy
    #[arg(long)]
    pub no_metadata: bool,

    /// Page range to extract (e.g. '2-5', '3-', '-4' or '7')
    #[arg(long, value_name = "START-END")]
    pub pages: Option<String>,

    /// Generate entry tags from page text and bookmarks
    #[arg(long)]
    pub tags_from_text: bool,

    /// Attach a note to every entry
    #[arg(long)]
    pub note: Option<String>,

    /// Module identifier for the manifest (defaults to the PDF file name)
    #[arg(long)]
    pub module_id: Option<String>,

    /// Module title for the manifest (defaults to the PDF file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Directory prefix for image references in the generated entries
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<String>,

    /// Grid size for generated scenes
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    pub grid_size: u32,
}
