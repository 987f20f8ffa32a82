use crate::error::Error;
use crate::storage::Database;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    title: String,
    language: String,
    #[serde(default)]
    collection: Option<String>,
}

#[derive(Debug, Default)]
pub struct CatalogLoadStats {
    pub records_created: usize,
    pub duplicates_skipped: usize,
}

/// Load catalog records from a CSV file with `title,language,collection`
/// columns. Languages and collections are created on first sight; a title
/// already present for the same language is skipped rather than duplicated.
pub fn load_catalog_csv(db: &Database, path: &Path) -> Result<CatalogLoadStats, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut stats = CatalogLoadStats::default();

    for row in reader.deserialize() {
        let row: CatalogRow = row?;
        let title = row.title.trim();
        let language = row.language.trim();
        if title.is_empty() || language.is_empty() {
            debug!("Skipping catalog row with empty title or language");
            continue;
        }

        let language_id = db.ensure_language(language)?;
        if db.catalog_record_exists(title, language_id)? {
            stats.duplicates_skipped += 1;
            continue;
        }

        let collection_id = match row.collection.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(db.ensure_collection(name)?),
            _ => None,
        };
        db.insert_catalog_record(title, language_id, collection_id)?;
        stats.records_created += 1;
    }

    info!(
        "Catalog load complete: {} created, {} duplicates skipped",
        stats.records_created, stats.duplicates_skipped,
    );
    Ok(stats)
}
