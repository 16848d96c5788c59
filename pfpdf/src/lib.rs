//! Turn a PDF's embedded images into a Foundry VTT module.
//!
//! [`ingestion`] pulls distinct, labeled images out of a document and
//! [`fvtt`] turns them into compendium entries, scenes and a manifest.

pub mod config;
pub mod error;
pub mod fvtt;
pub mod ingestion;
