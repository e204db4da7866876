//! XML canonicalization through an external tool, plus corpus-specific corrections
//!
//! The tool normalizes namespaces and attribute order but keeps leading
//! whitespace in front of some entries exactly as the source had it. The
//! fixup table removes those known divergences after canonicalization.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::{CanonicalizerConfig, DaccoConfig, NormalizationMode};
use crate::errors::{DaccoError, Result};
use crate::logger;

/// Literal substring replacement. Every occurrence of `find` is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixup {
    pub find: &'static str,
    pub replace: &'static str,
}

/// Ordered list of fixups. Each one operates on the result of the previous ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixupTable {
    pub version: u32,
    pub fixups: &'static [Fixup],
}

impl FixupTable {
    pub fn apply(&self, canonical: &str) -> String {
        self.fixups
            .iter()
            .fold(canonical.to_string(), |text, fixup| text.replace(fixup.find, fixup.replace))
    }
}

/// Known divergences in the cateng corpus.
pub const DACCO_FIXUPS: FixupTable = FixupTable {
    version: 1,
    fixups: &[
        Fixup {
            find: "     <Entry frequency=\"101\">babaganuix<nouns>",
            replace: "<Entry frequency=\"101\">babaganuix<nouns>",
        },
        Fixup {
            find: "    <Entry frequency=\"2780\">dacsa<nouns>",
            replace: "<Entry frequency=\"2780\">dacsa<nouns>",
        },
        Fixup {
            find: "    <Entry frequency=\"2040\">eben<nouns>",
            replace: "<Entry frequency=\"2040\">eben<nouns>",
        },
        Fixup {
            find: "    <Entry frequency=\"71200\">laberint<nouns>",
            replace: "<Entry frequency=\"71200\">laberint<nouns>",
        },
        Fixup {
            find: " <Entry frequency=\"218\">nabiu<nouns>",
            replace: "<Entry frequency=\"218\">nabiu<nouns>",
        },
        Fixup {
            find: "     <Entry frequency=\"199\">qatarià<nouns>",
            replace: "<Entry frequency=\"199\">qatarià<nouns>",
        },
        Fixup {
            find: "  <Entry frequency=\"24400\">tabac<nouns>",
            replace: "<Entry frequency=\"24400\">tabac<nouns>",
        },
        Fixup {
            find: "        <Entry frequency=\"154\">xacal<nouns>",
            replace: "<Entry frequency=\"154\">xacal<nouns>",
        },
        // Empty dictionary root holding only a tab
        Fixup {
            find: "<dictionary>\n\t\n</dictionary>\n",
            replace: "<dictionary>\n</dictionary>\n",
        },
        Fixup {
            find: "\t<Entry frequency=\"",
            replace: "<Entry frequency=\"",
        },
    ],
};

/// Runs `<program> <args...> <path>` and returns its standard output.
fn run_tool(program: &str, args: &[String], path: &Path) -> Result<Vec<u8>> {
    let tool_error = |message: String| DaccoError::CanonicalizationTool {
        tool: program.to_string(),
        path: path.to_path_buf(),
        message,
    };

    let output = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| tool_error(format!("failed to start: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(tool_error(format!("{}: {}", output.status, stderr.trim())));
    }

    Ok(output.stdout)
}

fn into_text(bytes: Vec<u8>, program: &str, path: &Path) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| DaccoError::CanonicalizationTool {
        tool: program.to_string(),
        path: path.to_path_buf(),
        message: format!("output is not valid UTF-8: {}", e),
    })
}

/// File to canonical text. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    tool: CanonicalizerConfig,
    normalization: NormalizationMode,
    fixups: FixupTable,
}

impl Canonicalizer {
    pub fn new(tool: CanonicalizerConfig, normalization: NormalizationMode) -> Self {
        Canonicalizer {
            tool,
            normalization,
            fixups: DACCO_FIXUPS,
        }
    }

    pub fn from_config(config: &DaccoConfig) -> Self {
        Self::new(config.canonicalizer.clone(), config.normalization.clone())
    }

    pub fn with_fixups(mut self, fixups: FixupTable) -> Self {
        self.fixups = fixups;
        self
    }

    pub fn fixups(&self) -> &FixupTable {
        &self.fixups
    }

    /// Canonical form of the XML file at `path`, normalized with the fixup
    /// table or with the external script, never both.
    pub fn canonicalize(&self, path: &Path) -> Result<String> {
        let raw = run_tool(&self.tool.program, &self.tool.args, path)?;
        let canonical = into_text(raw, &self.tool.program, path)?;

        match &self.normalization {
            NormalizationMode::FixupTable => Ok(self.fixups.apply(&canonical)),
            NormalizationMode::ExternalScript { program, args } => {
                self.run_normalize_script(program, args, &canonical, path)
            }
        }
    }

    /// The script receives the canonical text as a file path argument, like the tool itself.
    fn run_normalize_script(&self, program: &str, args: &[String], canonical: &str, source: &Path) -> Result<String> {
        let mut staged = tempfile::Builder::new()
            .prefix("dacco_c14n_")
            .tempfile()
            .map_err(|e| DaccoError::io(std::env::temp_dir(), e))?;

        staged
            .write_all(canonical.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| DaccoError::io(staged.path(), e))?;

        logger::debug(&format!("Normalizing canonical form of {} with {}", source.display(), program));

        let normalized = run_tool(program, args, staged.path())?;
        into_text(normalized, program, source)
    }
}
