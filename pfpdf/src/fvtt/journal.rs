//! Journal entries for the image compendium pack.

use serde::Serialize;

use crate::config::CatalogOptions;
use crate::ingestion::ExtractedImage;

use super::{derive_tags, folder_path, image_src, non_empty};

/// A journal entry holding one image page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub name: String,
    pub pages: Vec<JournalPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<EntryFlags>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalPage {
    pub name: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub src: String,
}

/// Entry flags, namespaced under `pfpdf`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFlags {
    pub pfpdf: ModuleFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl EntryFlags {
    /// Flags carrying whichever of module id and title are set and non-blank, if any
    pub fn from_options(options: &CatalogOptions) -> Option<Self> {
        let module_id = non_empty(&options.module_id);
        let title = non_empty(&options.title);
        if module_id.is_none() && title.is_none() {
            return None;
        }
        Some(Self {
            pfpdf: ModuleFlags { module_id, title },
        })
    }
}

/// One journal entry per image, in image order.
pub fn build_compendium_entries(
    images: &[ExtractedImage],
    options: &CatalogOptions,
) -> Vec<JournalEntry> {
    let flags = EntryFlags::from_options(options);

    images
        .iter()
        .map(|image| JournalEntry {
            name: image.name.clone(),
            pages: vec![JournalPage {
                name: image.name.clone(),
                page_type: "image".to_string(),
                src: image_src(image, options.image_dir.as_deref()),
            }],
            folder: folder_path(image),
            tags: options.tags_from_text.then(|| derive_tags(image)).flatten(),
            notes: non_empty(&options.note),
            flags: flags.clone(),
        })
        .collect()
}
