//! Ingestion of per-letter dictionary XML files into an entry store
//!
//! Each `Entry` element is captured as the exact slice of the source text it
//! occupies, located by reader byte offsets. The slice runs from the `<` of the
//! start tag to the end of the text that follows the closing tag, so that
//! concatenating the fragments of a file reproduces its layout between entries.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use walkdir::WalkDir;

use crate::config::DaccoConfig;
use crate::db::EntryStore;
use crate::encoding::read_xml_file;
use crate::errors::{DaccoError, Result};
use crate::logger;
use crate::types::{IngestStats, NewEntry};

pub const ENTRY_TAG: &[u8] = b"Entry";

/// An `Entry` element located in a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFragment<'a> {
    pub word: Option<String>,
    pub raw: &'a str,
}

struct Span {
    start: usize,
    end: usize,
    word: Option<String>,
}

/// Byte offset of the `<` opening the tag read at `pos`.
///
/// After a text event the reader has already consumed the following `<`.
fn tag_start(content: &[u8], pos: usize) -> usize {
    if content.get(pos) != Some(&b'<') && pos > 0 && content[pos - 1] == b'<' {
        pos - 1
    } else {
        pos
    }
}

/// End offset of a text event, excluding a consumed `<` of the next tag.
fn text_end(content: &[u8], pos: usize) -> usize {
    if pos > 0 && content[pos - 1] == b'<' {
        pos - 1
    } else {
        pos
    }
}

/// Locate every `Entry` element at any depth, in start-tag document order.
///
/// The tail of an entry runs over text, comments and processing instructions
/// up to the next start, empty or end tag. The headword is the text and CDATA
/// before the entry's first child element.
///
/// Returns a message describing the first well-formedness problem found.
pub fn parse_entries(content: &str) -> std::result::Result<Vec<EntryFragment<'_>>, String> {
    let bytes = content.as_bytes();

    let mut reader = Reader::from_str(content);
    reader.trim_text(false);
    reader.expand_empty_elements(false);
    reader.check_end_names(true);

    let mut spans: Vec<Span> = Vec::new();
    // One item per open element, holding the span index when the element is an Entry
    let mut open: Vec<Option<usize>> = Vec::new();
    // Entry whose headword is still being read, up to its first child or end tag
    let mut open_word: Option<usize> = None;
    // Entry whose tail is still being read, up to the next start, empty or end tag
    let mut open_tail: Option<usize> = None;

    loop {
        let event_start_pos = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| format!("near byte {}: {}", event_start_pos, e))?;
        let event_end_pos = reader.buffer_position();

        if matches!(event, Event::Start(_) | Event::Empty(_) | Event::End(_) | Event::Eof) {
            open_word = None;
            open_tail = None;
        }

        match event {
            Event::Start(ref e) => {
                if e.name().as_ref() == ENTRY_TAG {
                    spans.push(Span {
                        start: tag_start(bytes, event_start_pos),
                        end: event_end_pos,
                        word: None,
                    });
                    open.push(Some(spans.len() - 1));
                    open_word = Some(spans.len() - 1);
                } else {
                    open.push(None);
                }
            }
            Event::Empty(ref e) => {
                if e.name().as_ref() == ENTRY_TAG {
                    spans.push(Span {
                        start: tag_start(bytes, event_start_pos),
                        end: event_end_pos,
                        word: None,
                    });
                    open_tail = Some(spans.len() - 1);
                }
            }
            Event::End(_) => match open.pop() {
                Some(Some(idx)) => {
                    spans[idx].end = event_end_pos;
                    open_tail = Some(idx);
                }
                Some(None) => {}
                None => return Err(format!("unexpected closing tag near byte {}", event_start_pos)),
            },
            Event::Text(ref t) => {
                if let Some(idx) = open_word {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("near byte {}: {}", event_start_pos, e))?;
                    spans[idx].word.get_or_insert_with(String::new).push_str(&text);
                }
                if let Some(idx) = open_tail {
                    spans[idx].end = text_end(bytes, event_end_pos);
                }
            }
            Event::CData(ref c) => {
                if let Some(idx) = open_word {
                    let text = std::str::from_utf8(c)
                        .map_err(|e| format!("near byte {}: {}", event_start_pos, e))?;
                    spans[idx].word.get_or_insert_with(String::new).push_str(text);
                }
                if let Some(idx) = open_tail {
                    spans[idx].end = event_end_pos;
                }
            }
            Event::Comment(_) | Event::PI(_) => {
                if let Some(idx) = open_tail {
                    spans[idx].end = event_end_pos;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(format!("unexpected end of file with {} unclosed element(s)", open.len()));
    }

    spans
        .into_iter()
        .map(|s| {
            content
                .get(s.start..s.end)
                .map(|raw| EntryFragment { word: s.word, raw })
                .ok_or_else(|| format!("invalid fragment offsets {}..{}", s.start, s.end))
        })
        .collect()
}

/// Parse one dictionary file and append its entries to the store.
///
/// The whole file is parsed before anything is inserted, and its entries are
/// inserted as one batch. Batches from files ingested earlier are kept if this
/// file fails.
pub fn ingest_file<S: EntryStore + ?Sized>(path: &Path, store: &mut S) -> Result<usize> {
    let content = read_xml_file(path)?;

    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DaccoError::parse(path, "path has no file name"))?;

    let fragments = parse_entries(&content).map_err(|message| DaccoError::parse(path, message))?;

    let new_entries: Vec<NewEntry> = fragments
        .into_iter()
        .map(|f| NewEntry {
            word: f.word,
            source_file: source_file.clone(),
            raw_fragment: f.raw.to_string(),
        })
        .collect();

    store.insert_batch(&new_entries)?;

    logger::info(&format!("Ingested {} entries from {}", new_entries.len(), source_file));

    Ok(new_entries.len())
}

/// Ingest every `*.<extension>` file directly inside `dir`.
///
/// Files are visited in directory iteration order, not sorted. Ids are assigned
/// across files in this order.
pub fn ingest_directory<S: EntryStore + ?Sized>(dir: &Path, extension: &str, store: &mut S) -> Result<IngestStats> {
    let mut stats = IngestStats::default();

    for dir_entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let dir_entry = dir_entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            DaccoError::io(path, e.into())
        })?;

        let path = dir_entry.path();
        let matches_extension = path.extension().map(|ext| ext == extension).unwrap_or(false);
        if !dir_entry.file_type().is_file() || !matches_extension {
            continue;
        }

        stats.entries += ingest_file(path, store)?;
        stats.files += 1;
    }

    logger::info(&format!(
        "Ingested {} entries from {} files in {}",
        stats.entries,
        stats.files,
        dir.display()
    ));

    Ok(stats)
}

/// Ingest the configured dictionary, i.e. `<xml_directory>/<dictionary>/*.<extension>`
pub fn ingest_dictionary<S: EntryStore + ?Sized>(config: &DaccoConfig, store: &mut S) -> Result<IngestStats> {
    ingest_directory(&config.dictionary_directory(), &config.extension, store)
}
