pub mod dictionary;
pub mod dictionary_models;
pub mod dictionary_schema;
pub mod memory;

use crate::errors::Result;
use crate::types::{EntryRecord, NewEntry};

pub use dictionary::DictionaryDb;
pub use memory::MemoryStore;

/// Append-only ordered collection of dictionary entries.
///
/// Ids are assigned on insert and strictly increase. There is no update or delete.
pub trait EntryStore {
    /// Appends one entry and returns its assigned id.
    fn insert(&mut self, entry: &NewEntry) -> Result<i32>;

    /// Appends a batch in order. Implementations may commit it atomically.
    fn insert_batch(&mut self, entries: &[NewEntry]) -> Result<Vec<i32>> {
        entries.iter().map(|e| self.insert(e)).collect()
    }

    /// All entries whose source file matches `name` (ASCII case-insensitive), ascending by id.
    fn query_by_source_file(&mut self, name: &str) -> Result<Vec<EntryRecord>>;

    fn count(&mut self) -> Result<usize>;
}
