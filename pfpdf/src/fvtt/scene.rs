//! Scene definitions, one per extracted image.

use serde::Serialize;

use crate::config::CatalogOptions;
use crate::ingestion::ExtractedImage;

use super::{derive_tags, folder_path, image_src, non_empty};

/// Foundry's square grid
pub const GRID_TYPE_SQUARE: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    pub name: String,
    pub img: String,
    pub width: u32,
    pub height: u32,
    pub grid: u32,
    pub grid_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Build a scene for every image, sized to the image's pixel dimensions.
pub fn build_scenes(images: &[ExtractedImage], options: &CatalogOptions) -> Vec<SceneEntry> {
    images
        .iter()
        .map(|image| SceneEntry {
            name: image.name.clone(),
            img: image_src(image, options.image_dir.as_deref()),
            width: image.width,
            height: image.height,
            grid: options.grid_size,
            grid_type: GRID_TYPE_SQUARE,
            folder: folder_path(image),
            tags: options.tags_from_text.then(|| derive_tags(image)).flatten(),
            notes: non_empty(&options.note),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ExtractedImage;
    use serde_json::json;

    fn map_image() -> ExtractedImage {
        ExtractedImage {
            name: "map.png".to_string(),
            path: "maps/map.png".to_string(),
            width: 100,
            height: 200,
            page: 4,
            folders: vec!["Dungeon".to_string()],
            text: Some("Dungeon Map".to_string()),
        }
    }

    #[test]
    fn test_scene_with_tags_and_notes() {
        let options = CatalogOptions {
            grid_size: 75,
            tags_from_text: true,
            note: Some("Check traps".to_string()),
            ..Default::default()
        };

        let scenes = build_scenes(&[map_image()], &options);

        assert_eq!(
            serde_json::to_value(&scenes[0]).unwrap(),
            json!({
                "name": "map.png",
                "img": "maps/map.png",
                "width": 100,
                "height": 200,
                "grid": 75,
                "gridType": 1,
                "folder": "Dungeon",
                "tags": ["dungeon", "map"],
                "notes": "Check traps"
            })
        );
    }

    #[test]
    fn test_default_grid_and_optional_fields() {
        let mut image = map_image();
        image.folders.clear();

        let scenes = build_scenes(&[image], &CatalogOptions::default());

        assert_eq!(
            serde_json::to_value(&scenes[0]).unwrap(),
            json!({
                "name": "map.png",
                "img": "maps/map.png",
                "width": 100,
                "height": 200,
                "grid": 100,
                "gridType": 1
            })
        );
    }

    #[test]
    fn test_blank_note_is_omitted() {
        let options = CatalogOptions {
            note: Some(String::new()),
            ..Default::default()
        };

        let scenes = build_scenes(&[map_image()], &options);
        assert_eq!(scenes[0].notes, None);
        assert!(serde_json::to_value(&scenes[0]).unwrap().get("notes").is_none());
    }
}
