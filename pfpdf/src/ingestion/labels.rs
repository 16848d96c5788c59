//! Human-readable labels for extracted images.
//!
//! A label comes from the image's embedded name, else a caption found just
//! below (then above) the image, else its position on the page.

use regex::RegexSet;
use tracing::trace;

use super::source::{DocumentSource, ImageDescriptor};

/// Name shapes that PDF producers generate automatically
const DEFAULT_PLACEHOLDER_PATTERNS: &[&str] = &[r"fzimg\d+", r"im\d+", r"image\d+"];

/// Recognizes machine-generated image names.
///
/// Patterns are matched against the whole lowercased name.
#[derive(Debug, Clone)]
pub struct PlaceholderNames {
    patterns: Vec<String>,
    set: RegexSet,
}

impl PlaceholderNames {
    /// Build a matcher from unanchored patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = RegexSet::new(patterns.iter().map(|p| format!("^(?:{p})$")))?;
        Ok(Self { patterns, set })
    }

    /// Extend the matcher with another placeholder shape.
    pub fn with_pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        let mut patterns = self.patterns;
        patterns.push(pattern.to_string());
        Self::new(patterns)
    }

    pub fn is_placeholder(&self, name: &str) -> bool {
        self.set.is_match(&name.to_lowercase())
    }
}

impl Default for PlaceholderNames {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_PATTERNS.iter().copied())
            .expect("default placeholder patterns are valid")
    }
}

/// Derives labels for images on a page.
pub struct ImageLabeler {
    use_metadata: bool,
    nearby_text_distance: f32,
    placeholders: PlaceholderNames,
}

impl ImageLabeler {
    pub fn new(use_metadata: bool, nearby_text_distance: f32) -> Self {
        Self {
            use_metadata,
            nearby_text_distance,
            placeholders: PlaceholderNames::default(),
        }
    }

    pub fn with_placeholders(mut self, placeholders: PlaceholderNames) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Return a non-empty label for `image`.
    pub fn label(&self, source: &dyn DocumentSource, image: &ImageDescriptor) -> String {
        if self.use_metadata {
            if let Some(name) = self.embedded_name(image) {
                return name;
            }
            if let Some(caption) = self.nearby_text(source, image) {
                return caption;
            }
        }
        format!("p{}_img{}", image.page, image.index)
    }

    fn embedded_name(&self, image: &ImageDescriptor) -> Option<String> {
        let name = image.name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        if self.placeholders.is_placeholder(name) {
            trace!(
                page = image.page,
                image_index = image.index,
                name = name,
                "Ignoring generated image name"
            );
            return None;
        }
        Some(name.to_string())
    }

    /// Captions usually sit under a figure; titles sometimes sit over it.
    fn nearby_text(&self, source: &dyn DocumentSource, image: &ImageDescriptor) -> Option<String> {
        let bands = [
            image.bounds.band_below(self.nearby_text_distance),
            image.bounds.band_above(self.nearby_text_distance),
        ];
        bands.iter().find_map(|band| {
            let text = source.text_near(image.page, band);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
    }
}
