//! Regenerate per-letter dictionary files from an entry store

use std::fs;
use std::path::{Path, PathBuf};

use crate::db::EntryStore;
use crate::errors::{DaccoError, Result};
use crate::logger;
use crate::types::{EntryRecord, letter_file_name, letters};

/// Header of `a.dic`, reproduced byte for byte from the legacy export tool.
pub const LEGACY_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><!DOCTYPE dictionary SYSTEM \"dic.dtd\">\n",
    "            <dictionary xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
    "xsi:noNamespaceSchemaLocation=\"file:///C:/Documents%20and%20Settings/James/My%20Documents/",
    "My%20Projects/dacco%20projects/Publisher/input/cateng/dic.xsd\">\n",
);

pub const PLAIN_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<dictionary>\n";

pub const FOOTER: &str = "</dictionary>";

/// Only the first letter's file carries the legacy header.
pub fn header_for_letter(letter: char) -> &'static str {
    if letter == 'a' { LEGACY_HEADER } else { PLAIN_HEADER }
}

/// Header, raw fragments in the given order, footer.
pub fn render_letter(letter: char, records: &[EntryRecord]) -> String {
    let body_len: usize = records.iter().map(|r| r.raw_fragment.len()).sum();
    let header = header_for_letter(letter);

    let mut xml = String::with_capacity(header.len() + body_len + FOOTER.len());
    xml.push_str(header);
    for record in records {
        xml.push_str(&record.raw_fragment);
    }
    xml.push_str(FOOTER);
    xml
}

/// Write `<letter>.<extension>` into `output_directory` from the store's entries for that file.
pub fn generate_output_for_letter<S: EntryStore + ?Sized>(
    output_directory: &Path,
    letter: char,
    extension: &str,
    store: &mut S,
) -> Result<PathBuf> {
    let file_name = letter_file_name(letter, extension);
    let records = store.query_by_source_file(&file_name)?;

    let path = output_directory.join(&file_name);
    fs::write(&path, render_letter(letter, &records)).map_err(|e| DaccoError::io(&path, e))?;

    logger::debug(&format!("Wrote {} entries to {}", records.len(), path.display()));

    Ok(path)
}

/// Write all 26 letter files, a to z, creating `output_directory` if needed.
pub fn generate_output<S: EntryStore + ?Sized>(
    output_directory: &Path,
    extension: &str,
    store: &mut S,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_directory).map_err(|e| DaccoError::io(output_directory, e))?;

    let paths = letters()
        .map(|letter| generate_output_for_letter(output_directory, letter, extension, store))
        .collect::<Result<Vec<_>>>()?;

    logger::info(&format!("Generated {} files in {}", paths.len(), output_directory.display()));

    Ok(paths)
}
