use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DaccoError, Result};

pub const DEFAULT_XML_DIRECTORY: &str = "/usr/share/dacco-common/dictionaries/";
pub const DEFAULT_DICTIONARY: &str = "cateng";
pub const DEFAULT_EXTENSION: &str = "dic";

/// How the external canonicalization tool is invoked: `<program> <args...> <filepath>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalizerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CanonicalizerConfig {
    fn default() -> Self {
        CanonicalizerConfig {
            program: "xsec-c14n".to_string(),
            args: vec!["-n".to_string()],
        }
    }
}

/// Post-processing applied to the canonicalizer output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Apply the built-in literal fixup table.
    #[default]
    FixupTable,
    /// Run `<program> <args...>` on a file holding the canonical output and use its stdout.
    ExternalScript { program: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaccoConfig {
    pub xml_directory: PathBuf,
    pub dictionary: String,
    pub extension: String,
    pub canonicalizer: CanonicalizerConfig,
    pub normalization: NormalizationMode,
    /// Copied next to regenerated files before comparing, so DOCTYPE references resolve.
    pub support_files: Vec<String>,
}

impl Default for DaccoConfig {
    fn default() -> Self {
        DaccoConfig {
            xml_directory: PathBuf::from(DEFAULT_XML_DIRECTORY),
            dictionary: DEFAULT_DICTIONARY.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            canonicalizer: CanonicalizerConfig::default(),
            normalization: NormalizationMode::default(),
            support_files: vec!["dic.dtd".to_string()],
        }
    }
}

impl DaccoConfig {
    /// Defaults overridden by `DACCO_*` environment variables, after loading `.env`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = DaccoConfig::default();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DaccoError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| DaccoError::Config(format!("{}: {}", path.display(), e)))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("DACCO_XML_DIR") {
            self.xml_directory = PathBuf::from(dir);
        }
        if let Some(dictionary) = get("DACCO_DICTIONARY") {
            self.dictionary = dictionary;
        }
        if let Some(program) = get("DACCO_C14N_TOOL") {
            self.canonicalizer.program = program;
        }
        if let Some(args) = get("DACCO_C14N_ARGS") {
            self.canonicalizer.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(script) = get("DACCO_NORMALIZE_SCRIPT") {
            let mut parts = script.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                self.normalization = NormalizationMode::ExternalScript {
                    program,
                    args: parts.collect(),
                };
            }
        }
    }

    /// The directory holding the per-letter files, e.g. `/usr/share/dacco-common/dictionaries/cateng`
    pub fn dictionary_directory(&self) -> PathBuf {
        self.xml_directory.join(&self.dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DACCO_XML_DIR", "/tmp/dicts"),
            ("DACCO_C14N_ARGS", "-n  -x"),
            ("DACCO_NORMALIZE_SCRIPT", "normalize.sh --strict"),
            ("DACCO_DICTIONARY", "  "),
        ]);

        let mut config = DaccoConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.dictionary_directory(), PathBuf::from("/tmp/dicts/cateng"));
        assert_eq!(config.canonicalizer.program, "xsec-c14n");
        assert_eq!(config.canonicalizer.args, vec!["-n", "-x"]);
        assert_eq!(
            config.normalization,
            NormalizationMode::ExternalScript {
                program: "normalize.sh".to_string(),
                args: vec!["--strict".to_string()],
            }
        );
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dacco.json");
        std::fs::write(&path, r#"{ "canonicalizer": { "program": "cat", "args": [] } }"#).unwrap();

        let config = DaccoConfig::from_json_file(&path).unwrap();

        assert_eq!(config.canonicalizer.program, "cat");
        assert!(config.canonicalizer.args.is_empty());
        assert_eq!(config.extension, "dic");
        assert_eq!(config.normalization, NormalizationMode::FixupTable);
    }

    #[test]
    fn test_json_missing_file_names_path() {
        let err = DaccoConfig::from_json_file(Path::new("/nonexistent/dacco.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dacco.json"));
    }
}
