//! Diesel models for the dictionary entries table

use diesel::prelude::*;

use crate::db::dictionary_schema::entries;
use crate::types::{EntryRecord, NewEntry};

/// Insertable entry row
#[derive(Insertable)]
#[diesel(table_name = entries)]
pub struct NewEntryRow<'a> {
    pub entry: Option<&'a str>,
    pub original_file: &'a str,
    pub xml: &'a str,
}

impl<'a> From<&'a NewEntry> for NewEntryRow<'a> {
    fn from(e: &'a NewEntry) -> Self {
        NewEntryRow {
            entry: e.word.as_deref(),
            original_file: &e.source_file,
            xml: &e.raw_fragment,
        }
    }
}

/// Queryable entry row
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EntryRow {
    pub id: i32,
    pub entry: Option<String>,
    pub original_file: String,
    pub xml: String,
}

impl From<EntryRow> for EntryRecord {
    fn from(row: EntryRow) -> Self {
        EntryRecord {
            id: row.id,
            word: row.entry,
            source_file: row.original_file,
            raw_fragment: row.xml,
        }
    }
}
