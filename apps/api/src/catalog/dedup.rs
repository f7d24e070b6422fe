use uuid::Uuid;

use crate::models::CatalogEntry;

/// Returns the first entry whose title equals `title` up to case folding.
/// `exclude` skips the record being edited so it doesn't collide with itself.
///
/// The check is global across the catalog, not per category.
pub fn find_title_conflict<'a>(
    entries: &'a [CatalogEntry],
    title: &str,
    exclude: Option<Uuid>,
) -> Option<&'a CatalogEntry> {
    let needle = fold(title);
    entries
        .iter()
        .filter(|e| Some(e.id) != exclude)
        .find(|e| fold(&e.record.title) == needle)
}

fn fold(title: &str) -> String {
    title.trim().to_lowercase()
}
