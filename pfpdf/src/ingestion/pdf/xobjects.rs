//! Image XObject identities from page resource dictionaries via qpdf.
//!
//! pdfium decodes images but does not expose their object numbers, so each
//! page's `/Resources /XObject` dictionary (and those of the forms it draws)
//! is read with qpdf. A resource dictionary may list images the page never
//! draws, and may be shared between pages, so only names that appear as `Do`
//! operands in the page or form content count as candidates. A pdfium image
//! is paired with a candidate only when the match is unambiguous.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use qpdf::{
    QPdf, QPdfArray, QPdfDictionary, QPdfObject, QPdfObjectLike, QPdfObjectType, QPdfStream,
    StreamDecodeLevel,
};
use tracing::trace;

use crate::error::ProcessingError;

/// Forms nested deeper than this are not searched for images
pub(crate) const MAX_FORM_DEPTH: usize = 8;

/// An image XObject reachable from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageXObject {
    /// Resource name without the leading slash (e.g. "Im0")
    pub name: String,
    pub id: u32,
    pub generation: u16,
    pub width: u32,
    pub height: u32,
    /// Named by a `Do` operator in the content that owns the dictionary.
    /// Always true when that content could not be read.
    pub drawn: bool,
}

/// Image XObjects of one page, each claimable once
#[derive(Debug, Clone, Default)]
pub struct PageXObjects {
    entries: Vec<ImageXObject>,
    claimed: Vec<bool>,
}

impl PageXObjects {
    pub fn new(entries: Vec<ImageXObject>) -> Self {
        let claimed = vec![false; entries.len()];
        Self { entries, claimed }
    }

    /// Claim a drawn, unclaimed entry with exactly these pixel dimensions.
    ///
    /// Returns `None` when nothing qualifies or when the qualifying entries
    /// belong to different objects, leaving the image to be identified by
    /// content alone.
    pub fn claim(&mut self, width: u32, height: u32) -> Option<&ImageXObject> {
        let candidates: Vec<usize> = self
            .entries
            .iter()
            .zip(&self.claimed)
            .enumerate()
            .filter(|(_, (entry, claimed))| {
                !**claimed && entry.drawn && entry.width == width && entry.height == height
            })
            .map(|(i, _)| i)
            .collect();

        let position = *candidates.first()?;
        let object = (self.entries[position].id, self.entries[position].generation);
        if candidates
            .iter()
            .any(|&i| (self.entries[i].id, self.entries[i].generation) != object)
        {
            trace!(
                width = width,
                height = height,
                candidates = candidates.len(),
                "Ambiguous image XObject match"
            );
            return None;
        }

        self.claimed[position] = true;
        Some(&self.entries[position])
    }
}

/// Names used as `Do` operands in a content stream, in drawing order.
pub fn drawn_xobject_names(content: &str) -> Vec<String> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    tokens
        .windows(2)
        .filter(|pair| pair[1] == "Do" && pair[0].starts_with('/'))
        .map(|pair| pair[0].trim_start_matches('/').to_string())
        .collect()
}

/// Read image XObjects for every page, keyed by 1-indexed page number.
pub fn image_xobjects_by_page(path: &Path) -> Result<HashMap<usize, PageXObjects>, ProcessingError> {
    let pdf = QPdf::read(path).map_err(|e| ProcessingError::SourceUnavailable {
        path: path.to_path_buf(),
        message: format!("Failed to load PDF with qpdf: {}", e),
    })?;

    let pages = pdf
        .get_pages()
        .map_err(|e| ProcessingError::SourceUnavailable {
            path: path.to_path_buf(),
            message: format!("Failed to get pages from PDF: {}", e),
        })?;

    let mut by_page = HashMap::new();

    for (page_idx, page_dict) in pages.iter().enumerate() {
        let resources = match page_dict.get("/Resources") {
            Some(r) => r,
            None => {
                trace!(page = page_idx + 1, "No /Resources dictionary on page");
                continue;
            }
        };

        let content = page_dict.get("/Contents").and_then(page_content);
        let mut entries = Vec::new();
        collect_images(resources.into(), content.as_deref(), 0, &mut entries);

        if !entries.is_empty() {
            trace!(
                page = page_idx + 1,
                images = entries.len(),
                "Found image XObjects on page"
            );
            by_page.insert(page_idx + 1, PageXObjects::new(entries));
        }
    }

    Ok(by_page)
}

/// Concatenated, decoded page content. `/Contents` is a stream or an array of streams.
fn page_content(contents: QPdfObject) -> Option<String> {
    let streams: Vec<QPdfObject> = match contents.get_type() {
        QPdfObjectType::Stream => vec![contents],
        QPdfObjectType::Array => {
            let array: QPdfArray = contents.into();
            (0..array.len()).filter_map(|i| array.get(i)).collect()
        }
        _ => return None,
    };

    let mut content = String::new();
    for object in streams {
        if object.get_type() != QPdfObjectType::Stream {
            return None;
        }
        let stream: QPdfStream = object.into();
        let data = stream.get_data(StreamDecodeLevel::Generalized).ok()?;
        content.push_str(&String::from_utf8_lossy(&data));
        content.push('\n');
    }
    Some(content)
}

/// Gather image XObjects from a resource dictionary, descending into drawn forms.
fn collect_images(
    resources: QPdfDictionary,
    content: Option<&str>,
    depth: usize,
    entries: &mut Vec<ImageXObject>,
) {
    let Some(xobjects) = resources.get("/XObject") else {
        return;
    };
    let xobjects_dict: QPdfDictionary = xobjects.into();
    let drawn: Option<HashSet<String>> =
        content.map(|c| drawn_xobject_names(c).into_iter().collect());

    for key in xobjects_dict.keys() {
        let xobject = match xobjects_dict.get(&key) {
            Some(obj) => obj,
            None => continue,
        };

        if xobject.get_type() != QPdfObjectType::Stream {
            continue;
        }

        let name = key.trim_start_matches('/').to_string();
        let is_drawn = drawn.as_ref().is_none_or(|names| names.contains(&name));
        let id = xobject.get_id() as u32;
        let generation = xobject.get_generation() as u16;
        let stream: QPdfStream = xobject.into();
        let dict = stream.get_dictionary();

        let subtype = match dict.get("/Subtype") {
            Some(s) => s.as_name(),
            None => continue,
        };

        match subtype.as_str() {
            "/Image" => {
                let dimension = |field: &str| -> Option<u32> {
                    dict.get(field).and_then(|v| format!("{}", v).parse().ok())
                };
                let (Some(width), Some(height)) = (dimension("/Width"), dimension("/Height"))
                else {
                    trace!(xobject = %key, "Image XObject without dimensions");
                    continue;
                };

                entries.push(ImageXObject {
                    name,
                    id,
                    generation,
                    width,
                    height,
                    drawn: is_drawn,
                });
            }
            "/Form" if is_drawn && depth < MAX_FORM_DEPTH => {
                let Some(form_resources) = dict.get("/Resources") else {
                    continue;
                };
                let form_content = stream
                    .get_data(StreamDecodeLevel::Generalized)
                    .ok()
                    .map(|data| String::from_utf8_lossy(&data).into_owned());
                collect_images(
                    form_resources.into(),
                    form_content.as_deref(),
                    depth + 1,
                    entries,
                );
            }
            _ => {}
        }
    }
}
