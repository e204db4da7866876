// Character encoding detection for dictionary XML files.
// Line endings are kept as they are, fragments must match the source bytes.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::errors::{DaccoError, Result};
use crate::logger;

/// Reads an XML file, skips a byte order mark if present and decodes to UTF-8
pub fn read_xml_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DaccoError::io(path, e))?;

    let (encoding, bom_len) = detect_encoding(&bytes);

    logger::debug(&format!(
        "File: {:?}, Encoding: {}, BOM: {}",
        path.file_name().unwrap_or_default(),
        encoding.name(),
        bom_len > 0
    ));

    let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);

    if had_errors {
        logger::warn(&format!("Encoding errors detected while decoding {:?}", path));
    }

    Ok(decoded.into_owned())
}

/// Detects file encoding by examining the BOM, returns the encoding and the BOM length in bytes
fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, bom_len),
        None => (UTF_8, 0),
    }
}
