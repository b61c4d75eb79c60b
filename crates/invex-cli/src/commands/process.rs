//! Process command - locate one invoice file and extract its fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::{style, Term};
use tracing::{debug, info, warn};

use invex_core::models::config::InvexConfig;
use invex_core::{
    DocumentLoader, DocumentType, FileLocator, FsDocumentLoader, InvoiceParser, InvoiceRecord,
    JsonRecordWriter, RecordWriter, RuleInvoiceParser, WalkLocator,
};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Part of the file name to look for (asked for when omitted)
    name: Option<String>,

    /// Directory searched recursively for the file
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Maximum directory depth searched below the root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Document type: txt or pdf (default: from the file extension)
    #[arg(short = 't', long = "type")]
    doc_type: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Supplies the partial file name when none was given on the command line.
pub trait FilenamePrompt {
    fn ask(&self) -> anyhow::Result<String>;
}

/// Asks on the terminal.
pub struct ConsolePrompt {
    term: Term,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl FilenamePrompt for ConsolePrompt {
    fn ask(&self) -> anyhow::Result<String> {
        self.term.write_str("Invoice file name (or part of it): ")?;
        Ok(self.term.read_line()?.trim().to_string())
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut locator = WalkLocator::new();
    if let Some(depth) = args.max_depth {
        locator = locator.with_max_depth(depth);
    }

    let record = extract(
        &args,
        &config,
        &ConsolePrompt::new(),
        &locator,
        &FsDocumentLoader::new(),
    )?;

    let output = format_record(&record, args.format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        match args.format {
            OutputFormat::Json => {
                JsonRecordWriter::new(output_path)
                    .with_pretty(config.output.pretty)
                    .write(&record)?;
            }
            OutputFormat::Csv | OutputFormat::Text => fs::write(output_path, &output)?,
        }
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Locate, load and parse one document with the given collaborators.
pub fn extract(
    args: &ProcessArgs,
    config: &InvexConfig,
    prompt: &dyn FilenamePrompt,
    locator: &dyn FileLocator,
    loader: &dyn DocumentLoader,
) -> anyhow::Result<InvoiceRecord> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt.ask()?,
    };
    if name.is_empty() {
        anyhow::bail!("No file name given");
    }

    let path = locator.locate(&args.root, &name).ok_or_else(|| {
        anyhow::anyhow!(
            "No file matching '{}' found under {}",
            name,
            args.root.display()
        )
    })?;

    info!("Processing file: {}", path.display());

    let text = load_text(loader, &path, args.doc_type.as_deref())?;
    if text.trim().is_empty() {
        warn!("{} contains no text", path.display());
    }

    let parser = RuleInvoiceParser::from_config(&config.extraction);
    let result = parser.parse(&text);

    if let Some(error) = &result.error {
        eprintln!(
            "{} Extraction failed for {}: {}",
            style("!").yellow(),
            path.display(),
            error
        );
    }
    for warning in &result.warnings {
        debug!("{}", warning);
    }

    Ok(result.record)
}

/// Read a document, using the declared type or else the file extension.
pub fn load_text(
    loader: &dyn DocumentLoader,
    path: &Path,
    declared: Option<&str>,
) -> anyhow::Result<String> {
    let text = match declared {
        Some(declared) => loader.load_declared(path, declared)?,
        None => loader.load(path, DocumentType::from_path(path)?)?,
    };
    Ok(text)
}

pub fn format_record(
    record: &InvoiceRecord,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["invoice_number", "invoice_date", "net_amount", "gross_amount"])?;
    wtr.write_record(record_fields(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn record_fields(record: &InvoiceRecord) -> [String; 4] {
    [
        record.invoice_number.clone().unwrap_or_default(),
        record.invoice_date.clone().unwrap_or_default(),
        record.net_amount.map(|m| m.to_string()).unwrap_or_default(),
        record.gross_amount.map(|m| m.to_string()).unwrap_or_default(),
    ]
}

fn format_text(record: &InvoiceRecord) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str(&format!("Invoice: {}\n", show(record.invoice_number.clone())));
    output.push_str(&format!("Date:    {}\n", show(record.invoice_date.clone())));
    output.push_str(&format!(
        "Net:     {}\n",
        show(record.net_amount.map(|m| m.to_string()))
    ));
    output.push_str(&format!(
        "Gross:   {}\n",
        show(record.gross_amount.map(|m| m.to_string()))
    ));
    output
}
