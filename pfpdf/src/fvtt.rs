//! Foundry VTT catalog output.
//!
//! Builds journal (compendium) entries and scene definitions from extracted
//! images, plus the module manifest, and writes them as JSON.

pub mod journal;
pub mod manifest;
pub mod scene;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{ImportError, ImportResult, ProcessingError};
use crate::ingestion::ExtractedImage;

pub use journal::{EntryFlags, JournalEntry, JournalPage, ModuleFlags, build_compendium_entries};
pub use manifest::{ModuleManifest, PackDescriptor};
pub use scene::{GRID_TYPE_SQUARE, SceneEntry, build_scenes};

/// Compendium pack path relative to the output directory
pub const PACK_PATH: &str = "packs/images.json";
pub const SCENES_FILE: &str = "scenes.json";
pub const MANIFEST_FILE: &str = "module.json";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Lowercased word tokens of `text`
pub fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Lowercased folder segments followed by text tokens, first occurrence kept.
///
/// Returns `None` when nothing is left, so the field can be omitted.
pub(crate) fn derive_tags(image: &ExtractedImage) -> Option<Vec<String>> {
    let candidates = image
        .folders
        .iter()
        .map(|f| f.to_lowercase())
        .chain(image.text.as_deref().map(tokens).unwrap_or_default());

    let mut seen = HashSet::new();
    let tags: Vec<String> = candidates
        .filter(|tag| seen.insert(tag.clone()))
        .collect();

    (!tags.is_empty()).then_some(tags)
}

/// The option's value, unless it is missing or blank
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.trim().is_empty()).map(String::from)
}

/// Folder string for an entry, absent for images outside any bookmark
pub(crate) fn folder_path(image: &ExtractedImage) -> Option<String> {
    (!image.folders.is_empty()).then(|| image.folders.join("/"))
}

/// Image reference, optionally under a caller-supplied directory. Never resolved.
pub(crate) fn image_src(image: &ExtractedImage, image_dir: Option<&str>) -> String {
    match image_dir.map(|d| d.trim_end_matches('/')) {
        Some(dir) if !dir.is_empty() => format!("{}/{}", dir, image.path),
        _ => image.path.clone(),
    }
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> ImportResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ProcessingError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| ProcessingError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|source| ImportError::Serialization { what, source })?;
    writer.flush().map_err(|e| ProcessingError::io(path, e))?;

    debug!(path = %path.display(), what = what, "Wrote JSON");
    Ok(())
}

/// Paths of the files written by [`write_catalog`]
#[derive(Debug, Clone)]
pub struct CatalogFiles {
    pub pack: PathBuf,
    pub scenes: PathBuf,
    pub manifest: PathBuf,
}

#[derive(Serialize)]
struct SceneFile<'a> {
    scenes: &'a [SceneEntry],
}

/// Write the compendium pack, the scene list and the module manifest under `out_dir`.
pub fn write_catalog(
    out_dir: &Path,
    entries: &[JournalEntry],
    scenes: &[SceneEntry],
    manifest: &ModuleManifest,
) -> ImportResult<CatalogFiles> {
    let files = CatalogFiles {
        pack: out_dir.join(PACK_PATH),
        scenes: out_dir.join(SCENES_FILE),
        manifest: out_dir.join(MANIFEST_FILE),
    };

    write_json(&files.pack, "compendium entries", entries)?;
    write_json(&files.scenes, "scenes", &SceneFile { scenes })?;
    write_json(&files.manifest, "module manifest", manifest)?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::extracted;

    #[test]
    fn test_tags_keep_first_occurrence() {
        let image = extracted("a.jpg", &["Maps", "Dungeon"], Some("Dungeon map of the maps room"));
        assert_eq!(
            derive_tags(&image).unwrap(),
            ["maps", "dungeon", "map", "of", "the", "room"]
        );
    }

    #[test]
    fn test_tags_many_repeats() {
        let text = "goblin ".repeat(5000);
        let image = extracted("a.jpg", &[], Some(&text));
        assert_eq!(derive_tags(&image).unwrap(), ["goblin"]);
    }

    #[test]
    fn test_no_tags() {
        assert_eq!(derive_tags(&extracted("a.jpg", &[], Some("  "))), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("x".to_string())).as_deref(), Some("x"));
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some(" ".to_string())), None);
        assert_eq!(non_empty(&None), None);
    }
}


#[cfg(test)]
mod catalog_tests {
    use super::test_support::extracted;
    use super::*;
    use crate::config::CatalogOptions;
    use crate::config::ModuleIdentity;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn test_tokens() {
        assert_eq!(tokens("Dungeon Map"), ["dungeon", "map"]);
        assert_eq!(tokens("  The Keep: Level-2!\n"), ["the", "keep", "level", "2"]);
        assert!(tokens(" ... ").is_empty());
    }

    #[test]
    fn test_tags_folders_first_then_text() {
        let image = extracted("map.png", &["Dungeon"], Some("Dungeon Map"));
        assert_eq!(derive_tags(&image).unwrap(), ["dungeon", "map"]);

        let image = extracted("map.png", &["Part One", "Maps"], Some("maps and more maps"));
        assert_eq!(
            derive_tags(&image).unwrap(),
            ["part one", "maps", "and", "more"]
        );
    }

    #[test]
    fn test_tags_absent_when_empty() {
        assert_eq!(derive_tags(&extracted("a.jpg", &[], None)), None);
        assert_eq!(derive_tags(&extracted("a.jpg", &[], Some("  "))), None);
    }

    #[test]
    fn test_image_src() {
        let image = extracted("map.png", &[], None);
        assert_eq!(image_src(&image, None), "map.png");
        assert_eq!(image_src(&image, Some("assets")), "assets/map.png");
        assert_eq!(image_src(&image, Some("modules/x/img/")), "modules/x/img/map.png");
        assert_eq!(image_src(&image, Some("")), "map.png");
    }

    #[test]
    fn test_folder_path() {
        assert_eq!(folder_path(&extracted("a.jpg", &[], None)), None);
        assert_eq!(
            folder_path(&extracted("a.jpg", &["A", "B"], None)).as_deref(),
            Some("A/B")
        );
    }

    #[test]
    fn test_write_catalog() {
        let dir = TempDir::new().unwrap();
        let images = vec![extracted("map.png", &["Dungeon"], None)];
        let options = CatalogOptions::default();
        let identity = ModuleIdentity {
            module_id: "adventure".to_string(),
            title: "Adventure".to_string(),
        };

        let files = write_catalog(
            dir.path(),
            &build_compendium_entries(&images, &options),
            &build_scenes(&images, &options),
            &ModuleManifest::new(&identity),
        )
        .unwrap();

        assert_eq!(files.pack, dir.path().join("packs").join("images.json"));

        let read = |path: &Path| -> Value {
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
        };

        let pack = read(&files.pack);
        assert_eq!(pack.as_array().unwrap().len(), 1);
        assert_eq!(pack[0]["name"], "map.png");
        assert_eq!(pack[0]["folder"], "Dungeon");

        let scenes = read(&files.scenes);
        assert_eq!(scenes["scenes"][0]["img"], "map.png");
        assert_eq!(scenes["scenes"][0]["gridType"], 1);

        assert_eq!(
            read(&files.manifest),
            json!({
                "name": "adventure",
                "title": "Adventure",
                "packs": [{
                    "name": "images",
                    "label": "Images",
                    "path": "packs/images.json",
                    "type": "JournalEntry"
                }]
            })
        );
    }
}
