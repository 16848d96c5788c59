//! Bookmark outline extraction through `qpdf --json`.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ingestion::source::OutlineEntry;

/// Read the outline of `path`, flattened in document order.
///
/// A missing qpdf binary or unparseable output yields an empty outline.
pub fn extract_outline(path: &Path) -> Vec<OutlineEntry> {
    let output = match Command::new("qpdf").arg("--json").arg(path).output() {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "Failed to run qpdf, continuing without outline");
            return Vec::new();
        }
    };

    if !output.status.success() {
        warn!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "qpdf --json failed, continuing without outline"
        );
        return Vec::new();
    }

    let json: Value = match serde_json::from_slice(&output.stdout) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to parse qpdf JSON, continuing without outline");
            return Vec::new();
        }
    };

    let entries = parse_outline_json(&json);
    debug!(entries = entries.len(), "Extracted PDF outline");
    entries
}

/// Flatten the `outlines` tree of a qpdf JSON document.
///
/// Entries without a resolvable page are dropped, but their children are
/// still visited at the next level.
pub fn parse_outline_json(json: &Value) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    if let Some(outlines) = json.get("outlines") {
        walk_outlines(outlines, 1, &mut entries);
    }
    entries
}

fn walk_outlines(outlines: &Value, level: usize, entries: &mut Vec<OutlineEntry>) {
    let Some(array) = outlines.as_array() else {
        return;
    };

    for outline in array {
        let title = outline
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();

        let page = outline
            .get("destpageposfrom1")
            .and_then(Value::as_u64)
            .map(|p| p as usize)
            .or_else(|| outline.get("dest").and_then(extract_page_from_dest));

        match page {
            Some(page) if !title.is_empty() => entries.push(OutlineEntry::new(level, title, page)),
            _ => debug!(title = title, level = level, "Skipping outline entry without target page"),
        }

        if let Some(kids) = outline.get("kids") {
            walk_outlines(kids, level + 1, entries);
        }
    }
}

/// Page number (1-indexed) from a qpdf `dest` field.
///
/// qpdf writes either a `"page:N"` string or an array whose first element is
/// the page, both 0-indexed.
fn extract_page_from_dest(dest: &Value) -> Option<usize> {
    let first = match dest.as_array() {
        Some(arr) => arr.first()?,
        None => dest,
    };

    if let Some(s) = first.as_str() {
        s.strip_prefix("page:")?.parse::<usize>().ok().map(|p| p + 1)
    } else {
        first.as_u64().map(|n| n as usize + 1)
    }
}
