use std::fs;

use dacco_backend::DaccoError;
use dacco_backend::db::{DictionaryDb, EntryStore};
use dacco_backend::types::{IngestStats, letter_file_name, letters};
use dacco_backend::{db_to_xml, xml_to_db};

mod helpers;
use helpers::{build_corpus, cat_config, cat_oracle};

#[test]
fn test_all_letters_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let db_path = dir.path().join("dacco.sqlite3");
    let out_dir = dir.path().join("out/cateng");

    let stats = xml_to_db(&config, &db_path).unwrap();
    assert_eq!(stats, IngestStats { files: 26, entries: 10 });

    let paths = db_to_xml(&config, &db_path, &out_dir).unwrap();
    assert_eq!(paths.len(), 26);

    let reports = cat_oracle(&config)
        .verify_directories(&config.dictionary_directory(), &out_dir)
        .unwrap();

    assert_eq!(reports.len(), 26);
    for report in &reports {
        assert!(report.is_match(), "{} does not round trip", report.generated.display());
    }
}

#[test]
fn test_regeneration_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let db_path = dir.path().join("dacco.sqlite3");

    xml_to_db(&config, &db_path).unwrap();
    db_to_xml(&config, &db_path, &dir.path().join("first")).unwrap();

    // A second run starts again from a fresh store
    xml_to_db(&config, &db_path).unwrap();
    db_to_xml(&config, &db_path, &dir.path().join("second")).unwrap();

    for letter in letters() {
        let name = letter_file_name(letter, "dic");
        let first = fs::read(dir.path().join("first").join(&name)).unwrap();
        let second = fs::read(dir.path().join("second").join(&name)).unwrap();
        assert_eq!(first, second, "{} differs between runs", name);
    }
}

#[test]
fn test_second_cycle_keeps_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let first_db = dir.path().join("first.sqlite3");
    let second_db = dir.path().join("second.sqlite3");

    xml_to_db(&config, &first_db).unwrap();
    db_to_xml(&config, &first_db, &dir.path().join("regen/cateng")).unwrap();

    let regen_config = cat_config(&dir.path().join("regen"));
    xml_to_db(&regen_config, &second_db).unwrap();

    let mut first = DictionaryDb::open(&first_db).unwrap();
    let mut second = DictionaryDb::open(&second_db).unwrap();

    for name in ["a.dic", "c.dic", "x.dic"] {
        let a: Vec<String> = first
            .query_by_source_file(name)
            .unwrap()
            .into_iter()
            .map(|r| r.raw_fragment)
            .collect();
        let b: Vec<String> = second
            .query_by_source_file(name)
            .unwrap()
            .into_iter()
            .map(|r| r.raw_fragment)
            .collect();
        assert_eq!(a, b, "fragments of {} changed", name);
    }
}

#[test]
fn test_xml_to_db_overwrites_destination() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let db_path = dir.path().join("dacco.sqlite3");

    xml_to_db(&config, &db_path).unwrap();
    xml_to_db(&config, &db_path).unwrap();

    let mut db = DictionaryDb::open(&db_path).unwrap();
    assert_eq!(db.count().unwrap(), 10);
}

#[test]
fn test_parse_error_keeps_earlier_files() {
    let dir = tempfile::tempdir().unwrap();
    let cateng = dir.path().join("dictionaries/cateng");
    fs::create_dir_all(&cateng).unwrap();
    fs::write(cateng.join("a.dic"), "<dictionary>\n\t<Entry frequency=\"1\">abans</Entry>\n</dictionary>").unwrap();
    fs::write(cateng.join("b.dic"), "<dictionary>\n\t<Entry frequency=\"2\">bou\n</dictionary>").unwrap();
    fs::write(
        cateng.join("c.dic"),
        "<dictionary>\n\t<Entry frequency=\"3\">cap</Entry>\n\t<Entry frequency=\"4\">casa</Entry>\n</dictionary>",
    )
    .unwrap();

    // Files are ingested in directory order, so only those listed before b.dic get in
    let entries_per_file = [("a.dic", 1), ("c.dic", 2)];
    let mut expected = 0;
    for dir_entry in fs::read_dir(&cateng).unwrap() {
        let name = dir_entry.unwrap().file_name().to_string_lossy().into_owned();
        if name == "b.dic" {
            break;
        }
        expected += entries_per_file.iter().find(|(n, _)| *n == name).map(|(_, c)| *c).unwrap_or(0);
    }

    let config = cat_config(&dir.path().join("dictionaries"));
    let db_path = dir.path().join("dacco.sqlite3");

    let err = xml_to_db(&config, &db_path).unwrap_err();

    assert!(matches!(err, DaccoError::Parse { .. }));
    assert!(err.to_string().contains("b.dic"));

    let mut db = DictionaryDb::open(&db_path).unwrap();
    assert_eq!(db.count().unwrap(), expected);
    assert!(db.query_by_source_file("b.dic").unwrap().is_empty());
}
