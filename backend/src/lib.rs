pub mod canonical;
pub mod config;
pub mod db;
pub mod encoding;
pub mod errors;
pub mod ingest;
pub mod logger;
pub mod oracle;
pub mod regenerate;
pub mod types;

use std::path::{Path, PathBuf};

use crate::config::DaccoConfig;
use crate::db::DictionaryDb;
use crate::errors::Result;
use crate::types::IngestStats;

pub use crate::errors::DaccoError;

/// Ingest `<xml_directory>/<dictionary>` into a new database at `db_destination`.
///
/// An existing database at that path is deleted first. If a file fails to
/// parse, the batches of files ingested before it stay in the database.
pub fn xml_to_db(config: &DaccoConfig, db_destination: &Path) -> Result<IngestStats> {
    let mut db = DictionaryDb::create_fresh(db_destination)?;
    ingest::ingest_dictionary(config, &mut db)
}

/// Regenerate the 26 letter files from the database at `db_source`.
pub fn db_to_xml(config: &DaccoConfig, db_source: &Path, output_directory: &Path) -> Result<Vec<PathBuf>> {
    let mut db = DictionaryDb::open(db_source)?;
    regenerate::generate_output(output_directory, &config.extension, &mut db)
}
