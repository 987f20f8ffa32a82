use rusqlite::{Connection, Result};
use tracing::debug;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode, foreign keys on)");
        Ok(())
    }

    /// Apply the schema if the database is new or predates version 1.
    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(include_str!("schema.sql"))?;
            debug!("SQLite schema initialized (version 1)");
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Clear mutable pipeline state. Catalog tables are left alone; the
    /// catalog is owned by the library, not by the importer.
    pub fn truncate_import_state(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM unmatched_file;
             DELETE FROM import_run;
             DELETE FROM attachment;",
        )?;
        debug!("Import state tables truncated");
        Ok(())
    }

    pub fn truncate_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM unmatched_file;
             DELETE FROM import_run;
             DELETE FROM attachment;
             DELETE FROM catalog_record;
             DELETE FROM collection;
             DELETE FROM language;",
        )?;
        debug!("All tables truncated");
        Ok(())
    }
}
