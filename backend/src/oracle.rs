//! Round-trip equivalence check between original and regenerated dictionary files

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::canonical::Canonicalizer;
use crate::config::DaccoConfig;
use crate::errors::{DaccoError, Result};
use crate::logger;
use crate::types::{letter_file_name, letters};

/// Outcome of comparing two files. A mismatch is a result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Match,
    /// Paths of the persisted canonical forms, for inspecting the difference by hand.
    Mismatch {
        canonical_a: PathBuf,
        canonical_b: PathBuf,
    },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

/// Result for one letter of a directory verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterOutcome {
    Compared(Comparison),
    /// The canonicalization tool failed on this letter's files.
    ToolError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterReport {
    pub letter: char,
    pub original: PathBuf,
    pub generated: PathBuf,
    pub outcome: LetterOutcome,
}

impl LetterReport {
    pub fn is_match(&self) -> bool {
        matches!(&self.outcome, LetterOutcome::Compared(c) if c.is_match())
    }
}

/// "/usr/share/x/a.dic" -> "_usr_share_x_a.dic"
fn flat_name(path: &Path) -> String {
    path.to_string_lossy().replace(|c: char| c == '/' || c == '\\', "_")
}

/// Writes `content` to a new temporary file whose name ends with the flattened
/// `source` path. The file is removed on drop unless it is kept.
fn stage_diagnostic(source: &Path, content: &str) -> Result<NamedTempFile> {
    let tmp_dir = std::env::temp_dir();
    let mut file = tempfile::Builder::new()
        .prefix("dacco_")
        .suffix(&flat_name(source))
        .tempfile_in(&tmp_dir)
        .map_err(|e| DaccoError::io(&tmp_dir, e))?;

    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| DaccoError::io(file.path(), e))?;

    Ok(file)
}

fn keep_diagnostic(file: NamedTempFile) -> Result<PathBuf> {
    let (_, path) = file
        .keep()
        .map_err(|e| DaccoError::io(e.file.path(), e.error))?;
    Ok(path)
}

pub struct EquivalenceOracle {
    canonicalizer: Canonicalizer,
    extension: String,
    support_files: Vec<String>,
}

impl EquivalenceOracle {
    pub fn new(canonicalizer: Canonicalizer) -> Self {
        let defaults = DaccoConfig::default();
        EquivalenceOracle {
            canonicalizer,
            extension: defaults.extension,
            support_files: defaults.support_files,
        }
    }

    pub fn from_config(config: &DaccoConfig) -> Self {
        EquivalenceOracle {
            canonicalizer: Canonicalizer::from_config(config),
            extension: config.extension.clone(),
            support_files: config.support_files.clone(),
        }
    }

    /// Compares the canonical forms of two files.
    ///
    /// On mismatch both canonical forms are written to temporary files that are
    /// kept after the run, and their paths are returned and logged.
    pub fn compare_xml_files(&self, file_a: &Path, file_b: &Path) -> Result<Comparison> {
        let canonical_a = self.canonicalizer.canonicalize(file_a)?;
        let canonical_b = self.canonicalizer.canonicalize(file_b)?;

        if canonical_a == canonical_b {
            return Ok(Comparison::Match);
        }

        // Nothing is kept unless both sides were written
        let staged_a = stage_diagnostic(file_a, &canonical_a)?;
        let staged_b = stage_diagnostic(file_b, &canonical_b)?;
        let canonical_a = keep_diagnostic(staged_a)?;
        let canonical_b = keep_diagnostic(staged_b)?;

        logger::warn(&format!(
            "Files are not the same: {} and {}. Compare the canonicalized files: vimdiff {} {}",
            file_a.display(),
            file_b.display(),
            canonical_a.display(),
            canonical_b.display()
        ));

        Ok(Comparison::Mismatch { canonical_a, canonical_b })
    }

    pub fn compare(&self, file_a: &Path, file_b: &Path) -> Result<bool> {
        Ok(self.compare_xml_files(file_a, file_b)?.is_match())
    }

    /// Copies the support files (e.g. `dic.dtd`) from beside the original to
    /// beside the generated file, then compares.
    pub fn compare_dictionary_file_to_generated(&self, original: &Path, generated: &Path) -> Result<Comparison> {
        let original_dir = original.parent().unwrap_or(Path::new("."));
        let generated_dir = generated.parent().unwrap_or(Path::new("."));

        if original_dir != generated_dir {
            for name in &self.support_files {
                let src = original_dir.join(name);
                if src.is_file() {
                    let dst = generated_dir.join(name);
                    fs::copy(&src, &dst).map_err(|e| DaccoError::io(&dst, e))?;
                }
            }
        }

        self.compare_xml_files(original, generated)
    }

    /// Compares `<letter>.<extension>` in both directories for every letter a to z.
    ///
    /// A canonicalization tool failure is recorded for its letter and the
    /// remaining letters are still compared. Other errors abort the run.
    pub fn verify_directories(&self, original_dir: &Path, generated_dir: &Path) -> Result<Vec<LetterReport>> {
        letters()
            .map(|letter| -> Result<LetterReport> {
                let file_name = letter_file_name(letter, &self.extension);
                let original = original_dir.join(&file_name);
                let generated = generated_dir.join(&file_name);

                let outcome = match self.compare_dictionary_file_to_generated(&original, &generated) {
                    Ok(comparison) => {
                        if comparison.is_match() {
                            logger::info(&format!("{}: OK", file_name));
                        }
                        LetterOutcome::Compared(comparison)
                    }
                    Err(e @ DaccoError::CanonicalizationTool { .. }) => {
                        logger::error(&format!("{}: {}", file_name, e));
                        LetterOutcome::ToolError(e.to_string())
                    }
                    Err(e) => return Err(e),
                };

                Ok(LetterReport { letter, original, generated, outcome })
            })
            .collect()
    }
}
