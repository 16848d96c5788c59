//! `module.json` manifest referencing the image pack.

use serde::Serialize;

use crate::config::ModuleIdentity;

use super::PACK_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleManifest {
    pub name: String,
    pub title: String,
    pub packs: Vec<PackDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackDescriptor {
    pub name: String,
    pub label: String,
    pub path: String,
    #[serde(rename = "type")]
    pub document_type: String,
}

impl ModuleManifest {
    /// Manifest with the single journal-entry image pack
    pub fn new(identity: &ModuleIdentity) -> Self {
        Self {
            name: identity.module_id.clone(),
            title: identity.title.clone(),
            packs: vec![PackDescriptor {
                name: "images".to_string(),
                label: "Images".to_string(),
                path: PACK_PATH.to_string(),
                document_type: "JournalEntry".to_string(),
            }],
        }
    }
}
