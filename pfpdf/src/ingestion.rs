//! Image extraction pipeline.
//!
//! Pages are walked in order. Each image is labeled, checked against the
//! run's [`ExtractionSession`] for an earlier copy and saved only when it is
//! new. Folder paths come from the outline via [`page_hierarchy`].

pub mod hash;
pub mod hierarchy;
pub mod image_saving;
pub mod labels;
pub mod naming;
pub mod pdf;
pub mod session;
pub mod source;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::config::ExtractionOptions;
use crate::error::{ImportResult, ProcessingError};

pub use hierarchy::page_hierarchy;
pub use labels::{ImageLabeler, PlaceholderNames};
pub use naming::{NameAllocator, slugify};
pub use pdf::{PdfiumSource, create_pdfium};
pub use session::{ExtractedImage, Extraction, ExtractionSession, Registration};
pub use source::{DocumentSource, ImageDescriptor, OutlineEntry, Rectangle, ResourceId};

/// Extract every distinct image of `source` into `out_dir`.
///
/// The directory is created if missing. Each image is decoded at most once,
/// and only when its resource has not been seen earlier in the run. Any
/// decode or write failure aborts the whole run.
pub fn extract_images(
    source: &dyn DocumentSource,
    out_dir: &Path,
    options: &ExtractionOptions,
) -> ImportResult<Extraction> {
    std::fs::create_dir_all(out_dir).map_err(|e| ProcessingError::io(out_dir, e))?;

    let page_count = source.page_count();
    let hierarchy = if options.use_metadata {
        page_hierarchy(&source.outline()?, page_count)
    } else {
        BTreeMap::new()
    };

    let labeler = ImageLabeler::new(options.use_metadata, options.nearby_text_distance);
    let mut session = ExtractionSession::new(out_dir);
    let mut repeats = 0;
    let no_folders: Vec<String> = Vec::new();

    info!(
        pages = page_count,
        out_dir = %out_dir.display(),
        use_metadata = options.use_metadata,
        "Extracting images"
    );

    for page in 1..=page_count {
        if let Some(range) = &options.page_range
            && !range.contains(page)
        {
            continue;
        }

        let images = source.images_on_page(page)?;
        if images.is_empty() {
            continue;
        }

        let page_text = if options.include_text {
            Some(source.page_text(page)?)
        } else {
            None
        };
        let folders = hierarchy.get(&page).unwrap_or(&no_folders);

        debug!(page = page, images = images.len(), "Processing page");

        for image in &images {
            let label = labeler.label(source, image);
            let registration = session.register(image, &label, folders, page_text.as_deref(), || {
                source.decode_image(image)
            })?;
            if !matches!(registration, Registration::Saved(_)) {
                repeats += 1;
            }
        }
    }

    let extraction = session.finish();
    info!(
        images = extraction.images.len(),
        repeats = repeats,
        labels = extraction.labels.len(),
        "Image extraction complete"
    );

    Ok(extraction)
}

/// Plain text of every page, in page order
pub fn extract_text(source: &dyn DocumentSource) -> ImportResult<Vec<String>> {
    (1..=source.page_count())
        .map(|page| source.page_text(page))
        .collect()
}
