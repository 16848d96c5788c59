//! Capability interface over a parsed document.
//!
//! The extraction pipeline only needs page enumeration, decoded images with
//! their positions, positional text lookup and the outline. Keeping these
//! behind [`DocumentSource`] lets the pipeline run against an in-memory
//! document in tests.

use image::DynamicImage;

use crate::error::ImportResult;

/// Rectangle in page space (origin bottom-left, y grows upward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rectangle {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    /// Band of `distance` points directly under this rectangle
    pub fn band_below(&self, distance: f32) -> Rectangle {
        let bottom = self.y1.min(self.y2);
        Rectangle {
            x1: self.x1.min(self.x2),
            y1: bottom - distance,
            x2: self.x1.max(self.x2),
            y2: bottom,
        }
    }

    /// Band of `distance` points directly over this rectangle
    pub fn band_above(&self, distance: f32) -> Rectangle {
        let top = self.y1.max(self.y2);
        Rectangle {
            x1: self.x1.min(self.x2),
            y1: top,
            x2: self.x1.max(self.x2),
            y2: top + distance,
        }
    }
}

/// Document-scoped identity of an embedded image resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// Indirect PDF object; the same object may be drawn on many pages
    Object { id: u32, generation: u16 },
    /// Draw with no recoverable object number, unique per (page, index)
    Anonymous { page: usize, index: usize },
}

/// One image draw on a page. Pixels are decoded separately, on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    /// 1-indexed page number
    pub page: usize,
    /// 1-indexed position among the images on the page
    pub index: usize,
    pub resource: ResourceId,
    /// Name the document gives the image (e.g. the XObject resource name)
    pub name: Option<String>,
    /// Placement in page space. Images nested in a form carry the form's bounds.
    pub bounds: Rectangle,
}

/// A flattened outline (bookmark) entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Nesting depth, top level is 1
    pub level: usize,
    pub title: String,
    /// 1-indexed target page
    pub page: usize,
}

impl OutlineEntry {
    pub fn new(level: usize, title: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// Read access to a paginated document. Pages are 1-indexed.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    /// Outline entries in document order
    fn outline(&self) -> ImportResult<Vec<OutlineEntry>>;

    /// Images drawn on `page`, in drawing order, including those inside forms.
    /// Nothing is decoded here.
    fn images_on_page(&self, page: usize) -> ImportResult<Vec<ImageDescriptor>>;

    /// Decode the pixels of one image returned by [`images_on_page`].
    ///
    /// [`images_on_page`]: DocumentSource::images_on_page
    fn decode_image(&self, image: &ImageDescriptor) -> ImportResult<DynamicImage>;

    /// Text inside `rect` on `page`, possibly empty
    fn text_near(&self, page: usize, rect: &Rectangle) -> String;

    fn page_text(&self, page: usize) -> ImportResult<String>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_sit_outside_rectangle() {
        let r = Rectangle {
            x1: 20.0,
            y1: 100.0,
            x2: 120.0,
            y2: 200.0,
        };
        let below = r.band_below(20.0);
        assert_eq!((below.y1, below.y2), (80.0, 100.0));
        assert_eq!((below.x1, below.x2), (20.0, 120.0));

        let above = r.band_above(20.0);
        assert_eq!((above.y1, above.y2), (200.0, 220.0));
    }

    #[test]
    fn test_rectangle_dimensions_ignore_orientation() {
        let r = Rectangle {
            x1: 100.0,
            y1: 50.0,
            x2: 0.0,
            y2: 0.0,
        };
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
    }
}
