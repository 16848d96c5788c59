//! Page folder paths derived from the document outline.

use std::collections::BTreeMap;

use tracing::debug;

use super::source::OutlineEntry;

/// Map every page (1..=page_count) to the breadcrumb of outline titles active on it.
///
/// Entries are walked in target-page order. Each entry truncates the stack to
/// `level - 1` titles and pushes its own, so a level-1 entry replaces the whole
/// path and deeper entries nest under whatever is current. Pages without
/// entries inherit the previous page's path. Entries pointing at page 0 or past
/// the end of the document are never reached.
pub fn page_hierarchy(outline: &[OutlineEntry], page_count: usize) -> BTreeMap<usize, Vec<String>> {
    let mut entries: Vec<&OutlineEntry> = outline.iter().filter(|e| e.page >= 1).collect();
    // Stable: keeps document order among entries for the same page
    entries.sort_by_key(|e| e.page);

    let mut hierarchy = BTreeMap::new();
    let mut stack: Vec<String> = Vec::new();
    let mut cursor = entries.iter().peekable();

    for page in 1..=page_count {
        while let Some(entry) = cursor.next_if(|e| e.page == page) {
            stack.truncate(entry.level.max(1) - 1);
            stack.push(entry.title.clone());
        }
        hierarchy.insert(page, stack.clone());
    }

    let unreached = cursor.count();
    if unreached > 0 {
        debug!(
            entries = unreached,
            page_count = page_count,
            "Ignoring outline entries beyond the last page"
        );
    }

    hierarchy
}
