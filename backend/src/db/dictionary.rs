use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::db::EntryStore;
use crate::db::dictionary_models::{EntryRow, NewEntryRow};
use crate::errors::{DaccoError, Result};
use crate::logger::info;
use crate::types::{EntryRecord, NewEntry};

pub const DICTIONARY_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/dictionary");

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// SQLite-backed entry store. One connection, owned by the run that ingests or regenerates.
pub struct DictionaryDb {
    conn: SqliteConnection,
    path: PathBuf,
}

impl std::fmt::Debug for DictionaryDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryDb").field("path", &self.path).finish()
    }
}

impl DictionaryDb {
    /// Deletes any existing database at `db_path` and creates an empty one.
    pub fn create_fresh(db_path: &Path) -> Result<Self> {
        match std::fs::remove_file(db_path) {
            Ok(_) => info(&format!("Removed previous database: {}", db_path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(DaccoError::io(db_path, e)),
        }
        Self::connect(db_path)
    }

    /// Opens an existing database. A missing file is an error rather than a new empty store.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(DaccoError::io(
                db_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "database file not found"),
            ));
        }
        Self::connect(db_path)
    }

    fn connect(db_path: &Path) -> Result<Self> {
        let db_url = db_path.to_string_lossy();
        let mut conn = SqliteConnection::establish(&db_url).map_err(|e| DaccoError::Connection {
            path: db_path.to_path_buf(),
            source: e,
        })?;

        conn.run_pending_migrations(DICTIONARY_MIGRATIONS)
            .map_err(|e| DaccoError::Migration(e.to_string()))?;

        Ok(DictionaryDb {
            conn,
            path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn do_write<F, T>(&mut self, context: &str, operation: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> std::result::Result<T, diesel::result::Error>,
    {
        self.conn
            .transaction(operation)
            .map_err(|e| DaccoError::database(context, e))
    }

    fn do_read<F, T>(&mut self, context: &str, operation: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> std::result::Result<T, diesel::result::Error>,
    {
        operation(&mut self.conn).map_err(|e| DaccoError::database(context, e))
    }
}

fn insert_row(conn: &mut SqliteConnection, new_entry: &NewEntry) -> std::result::Result<i32, diesel::result::Error> {
    use crate::db::dictionary_schema::entries::dsl::{entries, id};

    diesel::insert_into(entries)
        .values(NewEntryRow::from(new_entry))
        .returning(id)
        .get_result(conn)
}

impl EntryStore for DictionaryDb {
    fn insert(&mut self, entry: &NewEntry) -> Result<i32> {
        self.do_write("inserting entry", |conn| insert_row(conn, entry))
    }

    /// The batch is committed in one transaction.
    fn insert_batch(&mut self, new_entries: &[NewEntry]) -> Result<Vec<i32>> {
        self.do_write("inserting entry batch", |conn| {
            new_entries.iter().map(|e| insert_row(conn, e)).collect()
        })
    }

    fn query_by_source_file(&mut self, name: &str) -> Result<Vec<EntryRecord>> {
        use crate::db::dictionary_schema::entries::dsl::*;

        let rows: Vec<EntryRow> = self.do_read("querying entries by source file", |conn| {
            entries
                .filter(lower(original_file).eq(lower(name)))
                .order_by(id.asc())
                .select(EntryRow::as_select())
                .load(conn)
        })?;

        Ok(rows.into_iter().map(EntryRecord::from).collect())
    }

    fn count(&mut self) -> Result<usize> {
        use crate::db::dictionary_schema::entries::dsl::*;

        let n: i64 = self.do_read("counting entries", |conn| entries.count().get_result(conn))?;
        Ok(n as usize)
    }
}
