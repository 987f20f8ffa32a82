use serde::Serialize;

/// Kind of stored artifact. The primary flag on an attachment is scoped to
/// its kind, not global across a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Document,
    Thumbnail,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Document => "document",
            ArtifactKind::Thumbnail => "thumbnail",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A language the catalog holds materials in.
#[derive(Debug, Clone)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

/// A named collection grouping catalog records.
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: i64,
    pub name: String,
}

/// A book-like entity in the catalog. Read-only from the pipeline's
/// perspective.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub id: i64,
    pub title: String,
    pub language_id: i64,
    pub collection_id: Option<i64>,
}

/// Denormalized candidate row used during matching: the record joined with
/// its language and collection display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCandidate {
    pub record_id: i64,
    pub title: String,
    pub language_name: String,
    pub collection_name: Option<String>,
}

/// A persisted link between a catalog record and a stored artifact file.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: i64,
    pub record_id: i64,
    pub kind: String,
    pub file_name: String,
    pub storage_path: String,
    pub is_primary: bool,
    pub provenance: String,
    pub sort_order: i64,
    pub active: bool,
    pub created_at: String,
}

/// One invocation of the reconciliation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRun {
    pub id: i64,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub status: String,
    pub root_path: String,
    pub files_discovered: i64,
    pub files_matched: i64,
    pub files_unmatched: i64,
}

/// A file a run could not reconcile, kept for triage. Write failures carry
/// the storage error text in `detail`.
#[derive(Debug, Clone)]
pub struct UnmatchedFile {
    pub id: i64,
    pub run_id: i64,
    pub file_name: String,
    pub reason: String,
    pub detail: Option<String>,
}
