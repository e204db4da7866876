use std::fs;
use std::path::{Path, PathBuf};

use dacco_backend::canonical::Canonicalizer;
use dacco_backend::config::{CanonicalizerConfig, DaccoConfig, NormalizationMode};
use dacco_backend::oracle::EquivalenceOracle;
use dacco_backend::regenerate::{FOOTER, PLAIN_HEADER};
use dacco_backend::types::{letter_file_name, letters};

pub const FIXTURE_LETTERS: [char; 4] = ['a', 'c', 't', 'x'];

#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/cateng")
}

#[allow(dead_code)]
pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("Failed to read fixture")
}

/// Lays out `<root>/cateng/` with the fixture letters, `dic.dtd` and an empty
/// file for every other letter. Returns `root`, i.e. the xml directory.
#[allow(dead_code)]
pub fn build_corpus(root: &Path) -> PathBuf {
    let cateng = root.join("cateng");
    fs::create_dir_all(&cateng).unwrap();

    for entry in fs::read_dir(fixtures_dir()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), cateng.join(entry.file_name())).unwrap();
    }

    for letter in letters().filter(|l| !FIXTURE_LETTERS.contains(l)) {
        let path = cateng.join(letter_file_name(letter, "dic"));
        fs::write(path, format!("{}{}", PLAIN_HEADER, FOOTER)).unwrap();
    }

    root.to_path_buf()
}

/// `cat` stands in for the canonicalization tool: the file bytes are the canonical form.
#[allow(dead_code)]
pub fn cat_config(xml_directory: &Path) -> DaccoConfig {
    DaccoConfig {
        xml_directory: xml_directory.to_path_buf(),
        canonicalizer: CanonicalizerConfig {
            program: "cat".to_string(),
            args: vec![],
        },
        normalization: NormalizationMode::FixupTable,
        ..DaccoConfig::default()
    }
}

#[allow(dead_code)]
pub fn cat_oracle(config: &DaccoConfig) -> EquivalenceOracle {
    EquivalenceOracle::from_config(config)
}

#[allow(dead_code)]
pub fn cat_canonicalizer(config: &DaccoConfig) -> Canonicalizer {
    Canonicalizer::from_config(config)
}
