//! Filesystem-safe, collision-free names for extracted images.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Stem used when a label has no alphanumeric characters at all
pub const FALLBACK_STEM: &str = "image";

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("valid slug pattern"));

/// Lowercase `text`, collapse every run of non-alphanumerics to `_` and trim
/// underscores from both ends.
pub fn slugify(text: &str) -> String {
    let slug = NON_ALPHANUMERIC
        .replace_all(text, "_")
        .trim_matches('_')
        .to_lowercase();
    if slug.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}

/// Hands out unique stems for the lifetime of one extraction run.
///
/// Allocations are never released.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a stem for `label`, suffixing `_1`, `_2`, ... on collision.
    pub fn allocate(&mut self, label: &str) -> String {
        let base = slugify(label);
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
