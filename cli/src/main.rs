use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenvy::dotenv;

use dacco_backend::config::DaccoConfig;
use dacco_backend::oracle::{Comparison, EquivalenceOracle, LetterOutcome};
use dacco_backend::{db_to_xml, logger, xml_to_db};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert the DACCO dictionary XML files to SQLite and back", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Optional JSON configuration file. Without it, configuration is read
    /// from the DACCO_* environment variables.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "DACCO_CONFIG")]
    config: Option<PathBuf>,

    /// silent, error, warn, info or debug. Overrides LOG_LEVEL.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the per-letter XML files into a new SQLite database
    #[command(name = "xml-to-db", arg_required_else_help = true)]
    XmlToDb {
        /// Directory to read the DACCO XML files from. Defaults to /usr/share/dacco-common/dictionaries/
        #[arg(long, value_name = "DIRECTORY_PATH")]
        xml_directory: Option<PathBuf>,

        /// Dictionary subdirectory holding the letter files
        #[arg(long, value_name = "NAME")]
        dictionary: Option<String>,

        /// sqlite3 filename where the output will be saved to. It is overwritten.
        #[arg(value_name = "DB_DESTINATION")]
        db_destination: PathBuf,
    },

    /// Write the per-letter XML files from a SQLite database
    #[command(name = "db-to-xml", arg_required_else_help = true)]
    DbToXml {
        /// sqlite3 filename of the database to output
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Directory where the files will be saved
        #[arg(value_name = "OUTPUT_DIRECTORY")]
        output_directory: PathBuf,
    },

    /// Compare original and regenerated letter files after canonicalization
    #[command(arg_required_else_help = true)]
    Verify {
        #[arg(value_name = "ORIGINAL_DIRECTORY")]
        original_directory: PathBuf,

        #[arg(value_name = "GENERATED_DIRECTORY")]
        generated_directory: PathBuf,
    },
}

fn load_config(config_path: Option<&Path>) -> Result<DaccoConfig> {
    match config_path {
        Some(path) => DaccoConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(DaccoConfig::from_env()),
    }
}

fn run_xml_to_db(
    mut config: DaccoConfig,
    xml_directory: Option<PathBuf>,
    dictionary: Option<String>,
    db_destination: &Path,
) -> Result<()> {
    if let Some(dir) = xml_directory {
        config.xml_directory = dir;
    }
    if let Some(name) = dictionary {
        config.dictionary = name;
    }

    let stats = xml_to_db(&config, db_destination).with_context(|| {
        format!(
            "Failed to ingest {} into {}",
            config.dictionary_directory().display(),
            db_destination.display()
        )
    })?;

    println!(
        "Ingested {} entries from {} files into {}",
        stats.entries,
        stats.files,
        db_destination.display()
    );
    Ok(())
}

fn run_db_to_xml(config: DaccoConfig, db: &Path, output_directory: &Path) -> Result<()> {
    let paths = db_to_xml(&config, db, output_directory)
        .with_context(|| format!("Failed to regenerate {} from {}", output_directory.display(), db.display()))?;

    println!("Wrote {} files to {}", paths.len(), output_directory.display());
    Ok(())
}

/// Returns whether every letter matched.
fn run_verify(config: DaccoConfig, original_directory: &Path, generated_directory: &Path) -> Result<bool> {
    let oracle = EquivalenceOracle::from_config(&config);
    let reports = oracle
        .verify_directories(original_directory, generated_directory)
        .context("Failed to compare files")?;

    let mut all_match = true;
    for report in &reports {
        match &report.outcome {
            LetterOutcome::Compared(Comparison::Match) => {
                println!("{} {}", "OK".green(), report.generated.display());
            }
            LetterOutcome::Compared(Comparison::Mismatch { canonical_a, canonical_b }) => {
                all_match = false;
                println!("{} {}", "MISMATCH".red().bold(), report.generated.display());
                println!("  Compare the canonicalized files:");
                println!("  {}", canonical_a.display());
                println!("  {}", canonical_b.display());
                println!("  vimdiff {} {}", canonical_a.display(), canonical_b.display());
            }
            LetterOutcome::ToolError(message) => {
                all_match = false;
                println!("{} {}", "ERROR".red().bold(), report.generated.display());
                println!("  {}", message);
            }
        }
    }

    Ok(all_match)
}

fn main() {
    if dotenv().is_err() {
        logger::debug("No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        if !logger::set_log_level_str(level) {
            eprintln!("Error: unknown log level '{}'", level);
            exit(1);
        }
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    };

    let command_result = match cli.command {
        Commands::XmlToDb { xml_directory, dictionary, db_destination } => {
            run_xml_to_db(config, xml_directory, dictionary, &db_destination)
        }

        Commands::DbToXml { db, output_directory } => run_db_to_xml(config, &db, &output_directory),

        Commands::Verify { original_directory, generated_directory } => {
            match run_verify(config, &original_directory, &generated_directory) {
                Ok(true) => Ok(()),
                Ok(false) => {
                    eprintln!("Error: regenerated files differ from the originals");
                    exit(1);
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = command_result {
        logger::error(&format!("{:#}", e));
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}
