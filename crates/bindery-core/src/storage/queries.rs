use super::models::*;
use super::sqlite::Database;
use crate::report::UnmatchedEntry;
use crate::scanner::ArtifactFile;
use rusqlite::{params, Connection, Result};
use tracing::debug;

/// Result of an attach operation for one primary/secondary pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Rows were written inside a single transaction.
    Created { attachment_count: usize },
    /// The (record, filename) pair was already attached; nothing written.
    AlreadyAttached,
}

impl Database {
    // ── Languages & Collections ──────────────────────────────────

    pub fn ensure_language(&self, name: &str) -> Result<i64> {
        self.connection().execute(
            "INSERT OR IGNORE INTO language (name) VALUES (?1)",
            params![name],
        )?;
        self.connection().query_row(
            "SELECT id FROM language WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }

    pub fn ensure_collection(&self, name: &str) -> Result<i64> {
        self.connection().execute(
            "INSERT OR IGNORE INTO collection (name) VALUES (?1)",
            params![name],
        )?;
        self.connection().query_row(
            "SELECT id FROM collection WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }

    // ── Catalog Records ──────────────────────────────────────────

    pub fn insert_catalog_record(
        &self,
        title: &str,
        language_id: i64,
        collection_id: Option<i64>,
    ) -> Result<i64> {
        self.connection().execute(
            "INSERT INTO catalog_record (title, language_id, collection_id) \
             VALUES (?1, ?2, ?3)",
            params![title, language_id, collection_id],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    pub fn catalog_record_exists(&self, title: &str, language_id: i64) -> Result<bool> {
        let count: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM catalog_record WHERE title = ?1 AND language_id = ?2",
            params![title, language_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count_catalog_records(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM catalog_record", [], |row| row.get(0))
    }

    /// Candidate rows for the matcher: records whose language name starts
    /// with the given label (SQLite LIKE is case-insensitive for ASCII).
    /// Ordered by record id so candidate iteration, and therefore tie
    /// breaking, is stable across runs.
    pub fn catalog_candidates_by_language_prefix(
        &self,
        language_label: &str,
    ) -> Result<Vec<CatalogCandidate>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT r.id, r.title, l.name, c.name \
             FROM catalog_record r \
             JOIN language l ON l.id = r.language_id \
             LEFT JOIN collection c ON c.id = r.collection_id \
             WHERE l.name LIKE ?1 \
             ORDER BY r.id",
        )?;
        let pattern = format!("{}%", language_label);
        let candidates = stmt
            .query_map(params![pattern], |row| {
                Ok(CatalogCandidate {
                    record_id: row.get(0)?,
                    title: row.get(1)?,
                    language_name: row.get(2)?,
                    collection_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(candidates)
    }

    // ── Attachments ──────────────────────────────────────────────

    pub fn attachment_exists(&self, record_id: i64, file_name: &str) -> Result<bool> {
        let count: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM attachment WHERE record_id = ?1 AND file_name = ?2",
            params![record_id, file_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Idempotently attach a primary artifact (and its optional secondary)
    /// to a catalog record.
    ///
    /// If the (record, primary filename) pair is already attached this is a
    /// no-op reporting `AlreadyAttached`. Otherwise both rows are written in
    /// one transaction so a failure leaves no half-attached state. The
    /// UNIQUE(record_id, file_name) index backs the existence check against
    /// concurrent runs.
    pub fn attach_artifacts(
        &self,
        record_id: i64,
        primary: &ArtifactFile,
        secondary: Option<&ArtifactFile>,
        provenance: &str,
    ) -> Result<AttachOutcome> {
        if self.attachment_exists(record_id, &primary.file_name)? {
            debug!(
                "Attachment already present for record {} / '{}', skipping",
                record_id, primary.file_name,
            );
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let tx = self.connection().unchecked_transaction()?;
        let mut attachment_count = 0;
        attachment_count +=
            insert_attachment(&tx, record_id, ArtifactKind::Document, primary, provenance)?;
        if let Some(secondary) = secondary {
            attachment_count +=
                insert_attachment(&tx, record_id, ArtifactKind::Thumbnail, secondary, provenance)?;
        }
        tx.commit()?;

        debug!(
            "Attached {} artifact(s) to record {} for '{}'",
            attachment_count, record_id, primary.file_name,
        );
        Ok(AttachOutcome::Created { attachment_count })
    }

    pub fn get_attachments_for_record(&self, record_id: i64) -> Result<Vec<Attachment>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, record_id, kind, file_name, storage_path, is_primary, \
                    provenance, sort_order, active, created_at \
             FROM attachment WHERE record_id = ?1 \
             ORDER BY kind, sort_order",
        )?;
        let attachments = stmt
            .query_map(params![record_id], |row| {
                Ok(Attachment {
                    id: row.get(0)?,
                    record_id: row.get(1)?,
                    kind: row.get(2)?,
                    file_name: row.get(3)?,
                    storage_path: row.get(4)?,
                    is_primary: row.get(5)?,
                    provenance: row.get(6)?,
                    sort_order: row.get(7)?,
                    active: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(attachments)
    }

    pub fn count_attachments(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM attachment", [], |row| row.get(0))
    }

    // ── Import Runs ──────────────────────────────────────────────

    pub fn create_import_run(&self, root_path: &str) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO import_run (started_at, status, root_path) \
             VALUES (?1, 'running', ?2)",
            params![now, root_path],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    pub fn complete_import_run(
        &self,
        run_id: i64,
        files_discovered: i64,
        files_matched: i64,
        files_unmatched: i64,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "UPDATE import_run SET completed_at = ?1, status = 'completed', \
             files_discovered = ?2, files_matched = ?3, files_unmatched = ?4 \
             WHERE id = ?5",
            params![now, files_discovered, files_matched, files_unmatched, run_id],
        )?;
        Ok(())
    }

    /// Mark a run cancelled. Per-file attaches are atomic, so everything
    /// written before the cancellation point remains valid.
    pub fn cancel_import_run(&self, run_id: i64) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "UPDATE import_run SET completed_at = ?1, status = 'cancelled' WHERE id = ?2",
            params![now, run_id],
        )?;
        Ok(())
    }

    pub fn insert_unmatched_files(
        &self,
        run_id: i64,
        entries: &[UnmatchedEntry],
    ) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO unmatched_file (run_id, file_name, reason, detail) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                count += stmt.execute(params![
                    run_id,
                    entry.file_name,
                    entry.reason.as_str(),
                    entry.detail,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    pub fn get_unmatched_files(&self, run_id: i64) -> Result<Vec<UnmatchedFile>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, run_id, file_name, reason, detail FROM unmatched_file \
             WHERE run_id = ?1 ORDER BY file_name",
        )?;
        let files = stmt
            .query_map(params![run_id], |row| {
                Ok(UnmatchedFile {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    file_name: row.get(2)?,
                    reason: row.get(3)?,
                    detail: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(files)
    }

    /// Recent import runs, newest first.
    pub fn list_import_runs(&self, limit: i64) -> Result<Vec<ImportRun>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, started_at, completed_at, status, root_path, \
                    files_discovered, files_matched, files_unmatched \
             FROM import_run ORDER BY id DESC LIMIT ?1",
        )?;
        let runs = stmt
            .query_map(params![limit], |row| {
                Ok(ImportRun {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    completed_at: row.get(2)?,
                    status: row.get(3)?,
                    root_path: row.get(4)?,
                    files_discovered: row.get(5)?,
                    files_matched: row.get(6)?,
                    files_unmatched: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(runs)
    }
}

/// Insert one attachment row inside the caller's transaction. The primary
/// flag and sort order are scoped per kind: the first artifact of a kind on
/// a record is its primary, later ones append.
fn insert_attachment(
    tx: &Connection,
    record_id: i64,
    kind: ArtifactKind,
    file: &ArtifactFile,
    provenance: &str,
) -> Result<usize> {
    let existing_of_kind: i64 = tx.query_row(
        "SELECT COUNT(*) FROM attachment WHERE record_id = ?1 AND kind = ?2",
        params![record_id, kind.as_str()],
        |row| row.get(0),
    )?;
    let now = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO attachment \
         (record_id, kind, file_name, storage_path, is_primary, provenance, \
          sort_order, active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
        params![
            record_id,
            kind.as_str(),
            file.file_name,
            file.path.to_string_lossy(),
            existing_of_kind == 0,
            provenance,
            existing_of_kind,
            now,
        ],
    )
}
