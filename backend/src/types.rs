//! Core data structures moved between the XML files and the store

use serde::{Deserialize, Serialize};

/// One `Entry` element as read from a source file, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Direct text of the element (the headword). Display only.
    pub word: Option<String>,
    /// Base name of the file the element was physically read from, e.g. "c.dic"
    pub source_file: String,
    /// Exact source text of the element, including its trailing text up to the next tag
    pub raw_fragment: String,
}

/// A stored entry. The id defines the re-emission order within a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: i32,
    pub word: Option<String>,
    pub source_file: String,
    pub raw_fragment: String,
}

impl std::fmt::Display for EntryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.word.as_deref().unwrap_or(""))
    }
}

/// Counts reported after an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files: usize,
    pub entries: usize,
}

/// Source file name for a letter, e.g. ('c', "dic") -> "c.dic"
pub fn letter_file_name(letter: char, extension: &str) -> String {
    format!("{}.{}", letter, extension)
}

/// The fixed a–z order used for regeneration and verification
pub fn letters() -> impl Iterator<Item = char> {
    'a'..='z'
}
