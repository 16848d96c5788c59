//! PDF document access.
//!
//! [`PdfiumSource`] implements [`DocumentSource`] for PDF files:
//! - pdfium-render for page iteration, image decoding and text lookup,
//!   including images nested in form XObjects
//! - qpdf for XObject object numbers and resource names ([`xobjects`])
//! - the qpdf command line for the bookmark outline ([`outline`])

pub mod outline;
pub mod xobjects;

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::error::{ImportResult, ProcessingError};

use super::source::{DocumentSource, ImageDescriptor, OutlineEntry, Rectangle, ResourceId};
use xobjects::{MAX_FORM_DEPTH, PageXObjects, image_xobjects_by_page};

/// Create a new Pdfium instance (dynamically linked).
///
/// Searches for libpdfium in:
/// 1. Current directory (./libpdfium.so)
/// 2. vendor/pdfium/lib/
/// 3. System library paths
pub fn create_pdfium() -> Result<Pdfium, ProcessingError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "./vendor/pdfium/lib/",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ProcessingError::PdfiumUnavailable {
            message: format!("install libpdfium or place it in ./vendor/pdfium/lib/: {:?}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Convert pdfium PdfRect to our Rectangle type
fn pdf_rect_to_rectangle(rect: &PdfRect) -> Rectangle {
    Rectangle {
        x1: rect.left().value,
        y1: rect.bottom().value,
        x2: rect.right().value,
        y2: rect.top().value,
    }
}

/// Call `visit` for every image object in drawing order, descending into forms.
///
/// Child bounds inside a form are in form space, so images nested in a form
/// are reported with the page-space bounds of the outermost form. Top-level
/// images get their own bounds, or `None` when pdfium cannot compute them.
fn visit_images<'a, I>(
    objects: I,
    form_bounds: Option<Rectangle>,
    depth: usize,
    visit: &mut dyn FnMut(&PdfPageImageObject, Option<Rectangle>) -> ControlFlow<()>,
) -> ControlFlow<()>
where
    I: Iterator<Item = PdfPageObject<'a>>,
{
    for object in objects {
        let own_bounds = || {
            object
                .bounds()
                .ok()
                .map(|quad_points| pdf_rect_to_rectangle(&quad_points.to_rect()))
        };

        match &object {
            PdfPageObject::Image(image_obj) => {
                visit(image_obj, form_bounds.or_else(own_bounds))?;
            }
            PdfPageObject::XObjectForm(form_obj) if depth < MAX_FORM_DEPTH => {
                trace!(
                    children = form_obj.len(),
                    depth = depth,
                    "Descending into form XObject"
                );
                visit_images(form_obj.iter(), form_bounds.or_else(own_bounds), depth + 1, visit)?;
            }
            _ => {}
        }
    }
    ControlFlow::Continue(())
}

/// A PDF opened with pdfium, with qpdf-derived resource identities
pub struct PdfiumSource<'a> {
    path: PathBuf,
    document: PdfDocument<'a>,
    xobjects: HashMap<usize, PageXObjects>,
}

impl<'a> PdfiumSource<'a> {
    /// Open `path`, failing with a source-unavailable error if pdfium cannot parse it.
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> ImportResult<Self> {
        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            ProcessingError::SourceUnavailable {
                path: path.to_path_buf(),
                message: format!("{:?}", e),
            }
        })?;

        let xobjects = match image_xobjects_by_page(path) {
            Ok(x) => {
                debug!(
                    pages_with_images = x.len(),
                    "Read image XObjects from PDF with qpdf"
                );
                x
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read image XObjects with qpdf, repeated images are matched by content only"
                );
                HashMap::new()
            }
        };

        info!(
            path = %path.display(),
            pages = document.pages().len(),
            "Opened PDF"
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
            xobjects,
        })
    }

    fn page(&self, page: usize) -> ImportResult<PdfPage<'_>> {
        let index = page
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| ProcessingError::SourceUnavailable {
                path: self.path.clone(),
                message: format!("page {} is out of range", page),
            })?;

        self.document.pages().get(index).map_err(|e| {
            ProcessingError::SourceUnavailable {
                path: self.path.clone(),
                message: format!("failed to load page {}: {:?}", page, e),
            }
            .into()
        })
    }
}

impl DocumentSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn outline(&self) -> ImportResult<Vec<OutlineEntry>> {
        Ok(outline::extract_outline(&self.path))
    }

    fn images_on_page(&self, page: usize) -> ImportResult<Vec<ImageDescriptor>> {
        let pdf_page = self.page(page)?;
        let page_bounds = Rectangle {
            x1: 0.0,
            y1: 0.0,
            x2: pdf_page.width().value,
            y2: pdf_page.height().value,
        };
        let mut xobjects = self.xobjects.get(&page).cloned().unwrap_or_default();
        let mut images = Vec::new();

        let _ = visit_images(pdf_page.objects().iter(), None, 0, &mut |image_obj, placement| {
            let index = images.len() + 1;
            let bounds = placement.unwrap_or(page_bounds);

            // Pixel size from the image metadata; nothing is decoded here
            let size = image_obj
                .width()
                .ok()
                .zip(image_obj.height().ok())
                .and_then(|(w, h)| Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?)));

            let (resource, name) = match size.and_then(|(w, h)| xobjects.claim(w, h)) {
                Some(xobject) => (
                    ResourceId::Object {
                        id: xobject.id,
                        generation: xobject.generation,
                    },
                    Some(xobject.name.clone()),
                ),
                None => (ResourceId::Anonymous { page, index }, None),
            };

            trace!(
                page = page,
                image_index = index,
                resource = ?resource,
                name = ?name,
                size = ?size,
                "Found image"
            );

            images.push(ImageDescriptor {
                page,
                index,
                resource,
                name,
                bounds,
            });
            ControlFlow::Continue(())
        });

        Ok(images)
    }

    fn decode_image(&self, image: &ImageDescriptor) -> ImportResult<DynamicImage> {
        let decode_error = |message: String| ProcessingError::ImageDecode {
            page: image.page,
            image_index: image.index,
            source: Box::new(std::io::Error::other(message)),
        };

        let pdf_page = self.page(image.page)?;
        let mut seen = 0;
        let mut decoded = None;

        let _ = visit_images(pdf_page.objects().iter(), None, 0, &mut |image_obj, _| {
            seen += 1;
            if seen < image.index {
                return ControlFlow::Continue(());
            }
            decoded = Some(
                image_obj
                    .get_raw_image()
                    .map_err(|e| decode_error(format!("{:?}", e))),
            );
            ControlFlow::Break(())
        });

        let pixels = decoded
            .unwrap_or_else(|| Err(decode_error("image is no longer on the page".to_string())))?;
        Ok(pixels)
    }

    fn text_near(&self, page: usize, rect: &Rectangle) -> String {
        let Ok(pdf_page) = self.page(page) else {
            return String::new();
        };
        match pdf_page.text() {
            Ok(text) => text.inside_rect(PdfRect::new_from_values(rect.y1, rect.x1, rect.y2, rect.x2)),
            Err(e) => {
                debug!(page = page, error = ?e, "Failed to get page text");
                String::new()
            }
        }
    }

    fn page_text(&self, page: usize) -> ImportResult<String> {
        let pdf_page = self.page(page)?;
        let text = pdf_page.text().map_err(|e| ProcessingError::PageText {
            page,
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{:?}", e),
            )),
        })?;
        Ok(text.all())
    }
}
