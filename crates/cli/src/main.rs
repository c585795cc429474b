// spdgen CLI - headless SPD honorarium template generation

mod exit_codes;
mod preview;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use spdgen_core::SPD_LAYOUT;
use spdgen_io::archive::{document_name, generate_all, BATCH_ARCHIVE_NAME};
use spdgen_io::dataset::load_records;
use spdgen_io::error::GenError;
use spdgen_io::template::TemplateSource;

use exit_codes::{
    EXIT_ERROR, EXIT_IO, EXIT_NAME, EXIT_PARSE, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "spdgen")]
#[command(about = "Generate filled SPD 3-honor templates from a tabular database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first rows of the database after normalization
    #[command(after_help = "\
Examples:
  spdgen preview honor.xlsx
  spdgen preview honor.csv --limit 10
  spdgen preview honor.csv --json")]
    Preview {
        /// Database file (.csv or spreadsheet)
        db: PathBuf,

        /// Rows to show
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Emit a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the distinct names in the database
    Names {
        /// Database file (.csv or spreadsheet)
        db: PathBuf,
    },

    /// Generate one filled template for a single person
    #[command(after_help = "\
Examples:
  spdgen generate honor.xlsx template.xlsx --name Budi
  spdgen generate honor.csv template.xlsx --name \"Siti Rahma\" -o out/siti.xlsx")]
    Generate {
        /// Database file (.csv or spreadsheet)
        db: PathBuf,

        /// SPD template (.xlsx)
        template: PathBuf,

        /// Row to fill, matched exactly against the Nama column
        /// (first match wins)
        #[arg(long)]
        name: String,

        /// Output path (default: Template_<name>.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate filled templates for every row, packed into a ZIP archive
    #[command(after_help = "\
Examples:
  spdgen generate-all honor.xlsx template.xlsx
  spdgen generate-all honor.csv template.xlsx -o batch.zip")]
    GenerateAll {
        /// Database file (.csv or spreadsheet)
        db: PathBuf,

        /// SPD template (.xlsx)
        template: PathBuf,

        /// Output path (default: Semua_Template_SPD.zip)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preview { db, limit, json } => cmd_preview(&db, limit, json),
        Commands::Names { db } => cmd_names(&db),
        Commands::Generate { db, template, name, output } => {
            cmd_generate(&db, &template, &name, output)
        }
        Commands::GenerateAll { db, template, output } => {
            cmd_generate_all(&db, &template, output)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    fn name_not_found(name: &str) -> Self {
        Self {
            code: EXIT_NAME,
            message: format!("no database row with Nama {:?}", name),
            hint: Some("run `spdgen names <db>` to list available names".to_string()),
        }
    }
}

impl From<GenError> for CliError {
    fn from(err: GenError) -> Self {
        let code = match &err {
            GenError::Io(_) => EXIT_IO,
            GenError::Parse(_) => EXIT_PARSE,
            GenError::MissingColumns(_) => EXIT_SCHEMA,
            GenError::Template(_) => EXIT_TEMPLATE,
        };
        let hint = match &err {
            GenError::MissingColumns(_) => {
                Some("check the header row of the database file".to_string())
            }
            GenError::Template(_) => {
                Some("the template must be a single-sheet .xlsx document".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

// ============================================================================
// preview
// ============================================================================

fn cmd_preview(db: &Path, limit: usize, json: bool) -> Result<(), CliError> {
    let records = load_records(db)?;
    let shown = &records[..records.len().min(limit)];

    if json {
        let rendered = serde_json::to_string_pretty(shown)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", rendered);
    } else {
        print!("{}", preview::render_table(shown));
        if records.len() > shown.len() {
            println!("({} of {} rows)", shown.len(), records.len());
        }
    }
    Ok(())
}

// ============================================================================
// names
// ============================================================================

fn cmd_names(db: &Path) -> Result<(), CliError> {
    let records = load_records(db)?;

    let mut seen = HashSet::new();
    for record in &records {
        if seen.insert(record.name.clone()) {
            println!("{}", record.name);
        }
    }
    Ok(())
}

// ============================================================================
// generate (single)
// ============================================================================

fn cmd_generate(
    db: &Path,
    template: &Path,
    name: &str,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let records = load_records(db)?;
    let record = records
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| CliError::name_not_found(name))?;

    let template = TemplateSource::from_path(template)?;
    let document = template.fill(record, &SPD_LAYOUT)?;

    // The default filename reuses the archive-entry sanitizer: a raw `/`
    // in a name is not writable as a filename
    let path = output.unwrap_or_else(|| PathBuf::from(document_name(&record.name)));
    fs::write(&path, &document)
        .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;

    println!("wrote {}", path.display());
    Ok(())
}

// ============================================================================
// generate-all (batch)
// ============================================================================

fn cmd_generate_all(db: &Path, template: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
    let records = load_records(db)?;
    let template = TemplateSource::from_path(template)?;

    let archive = generate_all(&template, &records, &SPD_LAYOUT)?;

    let path = output.unwrap_or_else(|| PathBuf::from(BATCH_ARCHIVE_NAME));
    fs::write(&path, &archive)
        .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;

    println!("wrote {} ({} templates)", path.display(), records.len());
    Ok(())
}
