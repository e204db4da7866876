use std::fs;

use dacco_backend::config::{CanonicalizerConfig, NormalizationMode};
use dacco_backend::oracle::{Comparison, LetterOutcome};
use dacco_backend::{db_to_xml, xml_to_db};

mod helpers;
use helpers::{build_corpus, cat_canonicalizer, cat_config, cat_oracle, fixtures_dir};

#[test]
fn test_mismatch_is_reported_per_letter() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let db_path = dir.path().join("dacco.sqlite3");
    let out_dir = dir.path().join("out");

    xml_to_db(&config, &db_path).unwrap();
    db_to_xml(&config, &db_path, &out_dir).unwrap();

    let t_path = out_dir.join("t.dic");
    let edited = fs::read_to_string(&t_path).unwrap().replace("tobacco", "tabacco");
    fs::write(&t_path, edited).unwrap();

    let reports = cat_oracle(&config)
        .verify_directories(&config.dictionary_directory(), &out_dir)
        .unwrap();

    let mismatched: Vec<char> = reports
        .iter()
        .filter(|r| !r.is_match())
        .map(|r| r.letter)
        .collect();
    assert_eq!(mismatched, vec!['t']);

    let Some(LetterOutcome::Compared(Comparison::Mismatch { canonical_a, canonical_b })) = reports
        .iter()
        .find(|r| r.letter == 't')
        .map(|r| r.outcome.clone())
    else {
        panic!("expected a mismatch for t.dic");
    };

    assert!(fs::read_to_string(&canonical_a).unwrap().contains("tobacco"));
    assert!(fs::read_to_string(&canonical_b).unwrap().contains("tabacco"));

    fs::remove_file(canonical_a).unwrap();
    fs::remove_file(canonical_b).unwrap();
}

#[test]
fn test_missing_generated_files_are_reported_per_letter() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let config = cat_config(&xml_dir);
    let db_path = dir.path().join("dacco.sqlite3");
    let out_dir = dir.path().join("out");

    xml_to_db(&config, &db_path).unwrap();
    db_to_xml(&config, &db_path, &out_dir).unwrap();
    fs::remove_file(out_dir.join("c.dic")).unwrap();

    let reports = cat_oracle(&config)
        .verify_directories(&config.dictionary_directory(), &out_dir)
        .unwrap();

    assert_eq!(reports.len(), 26);
    for report in &reports {
        if report.letter == 'c' {
            let LetterOutcome::ToolError(message) = &report.outcome else {
                panic!("expected a tool error for c.dic");
            };
            assert!(message.contains("c.dic"));
        } else {
            assert!(report.is_match(), "{} should still be compared", report.generated.display());
        }
    }
}

#[test]
fn test_fixups_are_deterministic_on_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let config = cat_config(dir.path());
    let canonicalizer = cat_canonicalizer(&config);

    for name in ["a.dic", "c.dic", "t.dic", "x.dic"] {
        let path = fixtures_dir().join(name);
        let first = canonicalizer.canonicalize(&path).unwrap();
        let second = canonicalizer.canonicalize(&path).unwrap();

        assert_eq!(first, second);
        assert!(!first.contains("\t<Entry frequency=\""), "{}: leading tab left", name);
    }

    let x = canonicalizer.canonicalize(&fixtures_dir().join("x.dic")).unwrap();
    assert!(x.contains("<dictionary>\n<Entry frequency=\"154\">xacal<nouns>"));
}

#[test]
fn test_external_script_mode_skips_fixup_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = cat_config(dir.path());
    config.normalization = NormalizationMode::ExternalScript {
        program: "cat".to_string(),
        args: vec![],
    };

    let canonical = cat_canonicalizer(&config)
        .canonicalize(&fixtures_dir().join("x.dic"))
        .unwrap();

    assert_eq!(canonical, fs::read_to_string(fixtures_dir().join("x.dic")).unwrap());
}

#[test]
fn test_unavailable_tool_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let xml_dir = build_corpus(&dir.path().join("dictionaries"));
    let mut config = cat_config(&xml_dir);
    config.canonicalizer = CanonicalizerConfig {
        program: "dacco-missing-c14n".to_string(),
        args: vec!["-n".to_string()],
    };

    let cateng = config.dictionary_directory();
    let err = cat_oracle(&config).compare(&cateng.join("a.dic"), &cateng.join("a.dic")).unwrap_err();

    assert!(err.to_string().contains("dacco-missing-c14n"));
}
