//! Run-scoped deduplication state.
//!
//! An [`ExtractionSession`] owns everything that must persist across pages:
//! which resources and pixel checksums have already been saved, which names
//! are taken, and which label resolved to which file. Each distinct image is
//! written exactly once; repeats only add label aliases.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::Serialize;
use tracing::debug;

use crate::error::ImportResult;

use super::hash::compute_pixel_hash;
use super::image_saving::{ImageFileFormat, save_image};
use super::naming::NameAllocator;
use super::source::{ImageDescriptor, ResourceId};

/// An image saved to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedImage {
    /// Unique file name (stem plus `png`/`jpg`)
    pub name: String,
    /// Path relative to the output directory
    pub path: String,
    pub width: u32,
    pub height: u32,
    /// 1-indexed page the image was first found on
    pub page: usize,
    /// Outline titles active on that page
    pub folders: Vec<String>,
    /// Full text of the page, when text capture is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Result of an extraction run
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Saved images in discovery order
    pub images: Vec<ExtractedImage>,
    /// Every label seen, mapped to the file name it resolved to
    pub labels: BTreeMap<String, String>,
}

/// How a registered image was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New image, written to disk
    Saved(usize),
    /// Resource already saved earlier in the run
    SameResource(usize),
    /// Different resource with identical pixels
    SameContent(usize),
}

/// Deduplication state for one extraction run
pub struct ExtractionSession {
    out_dir: PathBuf,
    images: Vec<ExtractedImage>,
    by_resource: HashMap<ResourceId, usize>,
    by_checksum: HashMap<String, usize>,
    names: NameAllocator,
    labels: BTreeMap<String, String>,
}

impl ExtractionSession {
    /// Start a session writing into `out_dir`, which must already exist.
    pub fn new(out_dir: &Path) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            images: Vec::new(),
            by_resource: HashMap::new(),
            by_checksum: HashMap::new(),
            names: NameAllocator::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Register one image draw under `label`.
    ///
    /// `decode` runs only when the resource has not been seen before. The
    /// decoded buffer is dropped before this returns.
    pub fn register<F>(
        &mut self,
        image: &ImageDescriptor,
        label: &str,
        folders: &[String],
        page_text: Option<&str>,
        decode: F,
    ) -> ImportResult<Registration>
    where
        F: FnOnce() -> ImportResult<DynamicImage>,
    {
        if let Some(&index) = self.by_resource.get(&image.resource) {
            self.alias(label, index);
            debug!(
                page = image.page,
                image_index = image.index,
                name = %self.images[index].name,
                "Image resource already extracted"
            );
            return Ok(Registration::SameResource(index));
        }

        let pixels = decode()?;
        let checksum = compute_pixel_hash(&pixels);
        if let Some(&index) = self.by_checksum.get(&checksum) {
            self.by_resource.insert(image.resource, index);
            self.alias(label, index);
            debug!(
                page = image.page,
                image_index = image.index,
                name = %self.images[index].name,
                "Identical image content already extracted"
            );
            return Ok(Registration::SameContent(index));
        }

        let format = ImageFileFormat::for_alpha(pixels.color().has_alpha());
        let name = format!("{}.{}", self.names.allocate(label), format.extension());
        save_image(&pixels, &self.out_dir.join(&name), format)?;

        let index = self.images.len();
        self.images.push(ExtractedImage {
            name: name.clone(),
            path: name,
            width: pixels.width(),
            height: pixels.height(),
            page: image.page,
            folders: folders.to_vec(),
            text: page_text.map(String::from),
        });
        self.by_resource.insert(image.resource, index);
        self.by_checksum.insert(checksum, index);
        self.alias(label, index);

        debug!(
            page = image.page,
            image_index = image.index,
            name = %self.images[index].name,
            "Extracted image"
        );

        Ok(Registration::Saved(index))
    }

    pub fn finish(self) -> Extraction {
        Extraction {
            images: self.images,
            labels: self.labels,
        }
    }

    fn alias(&mut self, label: &str, index: usize) {
        let name = &self.images[index].name;
        self.labels
            .entry(label.to_string())
            .or_insert_with(|| name.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImportError, ProcessingError};
    use crate::ingestion::source::Rectangle;
    use crate::ingestion::source::memory::{solid, solid_alpha};
    use tempfile::TempDir;

    fn descriptor(page: usize, index: usize, resource: ResourceId) -> ImageDescriptor {
        ImageDescriptor {
            page,
            index,
            resource,
            name: None,
            bounds: Rectangle {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
            },
        }
    }

    fn obj(id: u32) -> ResourceId {
        ResourceId::Object { id, generation: 0 }
    }

    fn shade(value: u8) -> impl FnOnce() -> ImportResult<DynamicImage> {
        move || Ok(solid(8, 6, value))
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_new_image_is_saved() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());
        let folders = vec!["Maps".to_string()];

        let result = session
            .register(&descriptor(2, 1, obj(5)), "Dungeon Map", &folders, Some("text"), shade(10))
            .unwrap();

        assert_eq!(result, Registration::Saved(0));
        let extraction = session.finish();
        let img = &extraction.images[0];
        assert_eq!(img.name, "dungeon_map.jpg");
        assert_eq!(img.path, "dungeon_map.jpg");
        assert_eq!((img.width, img.height), (8, 6));
        assert_eq!(img.page, 2);
        assert_eq!(img.folders, folders);
        assert_eq!(img.text.as_deref(), Some("text"));
        assert!(dir.path().join("dungeon_map.jpg").exists());
    }

    #[test]
    fn test_alpha_image_saved_as_png() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());

        session
            .register(&descriptor(1, 1, obj(1)), "Token", &[], None, || {
                Ok(solid_alpha(3, 3, 9))
            })
            .unwrap();

        assert_eq!(session.finish().images[0].name, "token.png");
        assert!(dir.path().join("token.png").exists());
    }

    #[test]
    fn test_same_resource_is_aliased_without_decoding() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());

        session
            .register(&descriptor(1, 1, obj(7)), "Crest", &[], None, shade(1))
            .unwrap();
        let repeat = session
            .register(&descriptor(4, 2, obj(7)), "Heraldry", &[], None, || {
                panic!("a known resource must not be decoded again")
            })
            .unwrap();

        assert_eq!(repeat, Registration::SameResource(0));
        assert_eq!(files_in(dir.path()), 1);

        let extraction = session.finish();
        assert_eq!(extraction.images.len(), 1);
        assert_eq!(extraction.labels["Crest"], "crest.jpg");
        assert_eq!(extraction.labels["Heraldry"], "crest.jpg");
    }

    #[test]
    fn test_identical_content_is_aliased() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());

        session
            .register(&descriptor(1, 1, obj(1)), "Logo", &[], None, shade(42))
            .unwrap();
        let copy = session
            .register(&descriptor(2, 1, obj(2)), "Logo Again", &[], None, shade(42))
            .unwrap();
        assert_eq!(copy, Registration::SameContent(0));

        // The second resource id now short-circuits without decoding
        let third = session
            .register(&descriptor(3, 1, obj(2)), "Logo Third", &[], None, || {
                panic!("aliased resource must not be decoded again")
            })
            .unwrap();
        assert_eq!(third, Registration::SameResource(0));

        assert_eq!(files_in(dir.path()), 1);
        let extraction = session.finish();
        assert_eq!(extraction.images.len(), 1);
        assert!(extraction.labels.values().all(|name| name == "logo.jpg"));
        assert_eq!(extraction.labels.len(), 3);
    }

    #[test]
    fn test_distinct_images_get_distinct_names() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());

        session.register(&descriptor(1, 1, obj(1)), "Map", &[], None, shade(1)).unwrap();
        session.register(&descriptor(1, 2, obj(2)), "Map", &[], None, shade(2)).unwrap();
        session.register(&descriptor(2, 1, obj(3)), "map", &[], None, shade(3)).unwrap();

        assert_eq!(files_in(dir.path()), 3);

        // First association for a label is kept
        let extraction = session.finish();
        let names: Vec<&str> = extraction.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["map.jpg", "map_1.jpg", "map_2.jpg"]);
        assert_eq!(extraction.labels["Map"], "map.jpg");
        assert_eq!(extraction.labels["map"], "map_2.jpg");
    }

    #[test]
    fn test_decode_failure_is_returned() {
        let dir = TempDir::new().unwrap();
        let mut session = ExtractionSession::new(dir.path());

        let result = session.register(&descriptor(3, 2, obj(9)), "Broken", &[], None, || {
            Err(ProcessingError::ImageDecode {
                page: 3,
                image_index: 2,
                source: Box::new(std::io::Error::other("bad stream")),
            }
            .into())
        });

        assert!(matches!(
            result,
            Err(ImportError::Processing(ProcessingError::ImageDecode { page: 3, image_index: 2, .. }))
        ));
        assert_eq!(files_in(dir.path()), 0);
        assert!(session.finish().labels.is_empty());
    }
}
