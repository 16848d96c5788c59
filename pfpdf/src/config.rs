//! Run configuration: extraction options, catalog options and module identity.
//!
//! Options arrive from the command line; the module id and title can be
//! overridden from the environment (see [`loader`]).

pub mod loader;
pub mod page_range;

use std::path::Path;

pub use loader::{EnvOverrides, load_env_overrides};
pub use page_range::PageRange;

use crate::ingestion::naming::slugify;

/// Grid size used for generated scenes when none is given
pub const DEFAULT_GRID_SIZE: u32 = 100;

/// Distance in PDF points searched below and above an image for a caption
pub const DEFAULT_NEARBY_TEXT_DISTANCE: f32 = 20.0;

/// Options controlling how images are pulled out of a document
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Use embedded names, nearby text and bookmarks. When off, names fall
    /// back to `p{page}_img{index}` and folder paths stay empty.
    pub use_metadata: bool,

    /// Capture the full text of each source page alongside its images
    pub include_text: bool,

    /// Inclusive page filter applied before any image is touched
    pub page_range: Option<PageRange>,

    pub nearby_text_distance: f32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            use_metadata: true,
            include_text: false,
            page_range: None,
            nearby_text_distance: DEFAULT_NEARBY_TEXT_DISTANCE,
        }
    }
}

/// Options controlling catalog entry synthesis
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub tags_from_text: bool,
    pub note: Option<String>,
    pub module_id: Option<String>,
    pub title: Option<String>,
    /// Prefix for image references, kept relative
    pub image_dir: Option<String>,
    pub grid_size: u32,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            tags_from_text: false,
            note: None,
            module_id: None,
            title: None,
            image_dir: None,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Resolved identifier and title of the generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    pub module_id: String,
    pub title: String,
}

impl ModuleIdentity {
    /// Resolve the module identity.
    ///
    /// Precedence is environment override, then explicit option, then the
    /// PDF file stem (slugified for the id, verbatim for the title). Blank
    /// values are skipped.
    pub fn resolve(
        pdf_path: &Path,
        module_id: Option<&str>,
        title: Option<&str>,
        overrides: &EnvOverrides,
    ) -> Self {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let given = |value: Option<&str>| value.filter(|v| !v.trim().is_empty()).map(String::from);
        let module_id = given(overrides.module_id.as_deref())
            .or_else(|| given(module_id))
            .unwrap_or_else(|| slugify(&stem));
        let title = given(overrides.title.as_deref())
            .or_else(|| given(title))
            .unwrap_or(stem);

        Self { module_id, title }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identity_values_are_skipped() {
        let identity = ModuleIdentity::resolve(
            Path::new("Core Rulebook.pdf"),
            Some(""),
            Some(" "),
            &EnvOverrides {
                module_id: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(identity.module_id, "core_rulebook");
        assert_eq!(identity.title, "Core Rulebook");
    }

    #[test]
    fn test_identity_falls_back_to_file_stem() {
        let identity = ModuleIdentity::resolve(
            Path::new("books/Core Rulebook.pdf"),
            None,
            None,
            &EnvOverrides::default(),
        );
        assert_eq!(identity.module_id, "core_rulebook");
        assert_eq!(identity.title, "Core Rulebook");
    }

    #[test]
    fn test_identity_prefers_explicit_options() {
        let identity = ModuleIdentity::resolve(
            Path::new("book.pdf"),
            Some("my-module"),
            Some("My Module"),
            &EnvOverrides::default(),
        );
        assert_eq!(identity.module_id, "my-module");
        assert_eq!(identity.title, "My Module");
    }

    #[test]
    fn test_identity_environment_wins() {
        let overrides = EnvOverrides {
            module_id: Some("env-id".to_string()),
            title: None,
        };
        let identity = ModuleIdentity::resolve(
            Path::new("book.pdf"),
            Some("cli-id"),
            Some("CLI Title"),
            &overrides,
        );
        assert_eq!(identity.module_id, "env-id");
        assert_eq!(identity.title, "CLI Title");
    }

    #[test]
    fn test_default_options() {
        let extraction = ExtractionOptions::default();
        assert!(extraction.use_metadata);
        assert!(!extraction.include_text);
        assert!(extraction.page_range.is_none());
        assert_eq!(extraction.nearby_text_distance, 20.0);

        let catalog = CatalogOptions::default();
        assert_eq!(catalog.grid_size, 100);
        assert!(!catalog.tags_from_text);
    }
}
