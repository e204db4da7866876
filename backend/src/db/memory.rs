use crate::db::EntryStore;
use crate::errors::Result;
use crate::types::{EntryRecord, NewEntry};

/// In-memory entry store, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<EntryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EntryRecord] {
        &self.records
    }
}

impl EntryStore for MemoryStore {
    fn insert(&mut self, entry: &NewEntry) -> Result<i32> {
        let id = self.records.last().map(|r| r.id + 1).unwrap_or(1);
        self.records.push(EntryRecord {
            id,
            word: entry.word.clone(),
            source_file: entry.source_file.clone(),
            raw_fragment: entry.raw_fragment.clone(),
        });
        Ok(id)
    }

    fn query_by_source_file(&mut self, name: &str) -> Result<Vec<EntryRecord>> {
        // Records are appended with increasing ids, so insertion order is id order.
        Ok(self
            .records
            .iter()
            .filter(|r| r.source_file.eq_ignore_ascii_case(name))
            .cloned()
            .collect())
    }

    fn count(&mut self) -> Result<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filters_by_file_in_id_order() {
        let mut store = MemoryStore::new();
        for (word, file) in [("cadira", "c.dic"), ("abans", "a.dic"), ("a continuació", "C.dic")] {
            store
                .insert(&NewEntry {
                    word: Some(word.to_string()),
                    source_file: file.to_string(),
                    raw_fragment: String::new(),
                })
                .unwrap();
        }

        let ids: Vec<i32> = store.query_by_source_file("c.dic").unwrap().iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.count().unwrap(), 3);
    }
}
