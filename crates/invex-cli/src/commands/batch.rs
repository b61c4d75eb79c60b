//! Batch processing command for multiple invoice files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invex_core::{
    DocumentType, FsDocumentLoader, InvoiceParser, InvoiceRecord, JsonRecordWriter, RecordWriter,
    RuleInvoiceParser,
};

use super::config::load_config;
use super::process::{format_record, load_text, record_fields, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match (&self.record, &self.error) {
            (Some(_), None) => "success",
            (Some(_), Some(_)) => "empty",
            (None, _) => "error",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentType::from_path(p).is_ok())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = RuleInvoiceParser::from_config(&config.extraction);
    let loader = FsDocumentLoader::new();
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let loaded = load_text(&loader, &path, None);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match loaded {
            Ok(text) => {
                let extraction = parser.parse(&text);
                results.push(ProcessResult {
                    path,
                    record: Some(extraction.record),
                    error: extraction.error.map(|e| e.to_string()),
                    processing_time_ms: processing_time_ms + extraction.processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        let mut taken = HashSet::new();
        for result in &results {
            if let Some(record) = &result.record {
                let target = output_path(output_dir, &result.path, args.format, &mut taken);
                write_output(&target, record, args.format, config.output.pretty)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.status() == "success").count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file for `source`, unique among the paths already in `taken`.
///
/// The source extension is kept, so `rechnung.txt` and `rechnung.pdf` get
/// separate outputs; equal file names from different directories are numbered.
fn output_path(
    output_dir: &Path,
    source: &Path,
    format: OutputFormat,
    taken: &mut HashSet<PathBuf>,
) -> PathBuf {
    let name = source
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    let mut path = output_dir.join(format!("{}.{}", name, format.extension()));
    let mut n = 1;
    while !taken.insert(path.clone()) {
        n += 1;
        path = output_dir.join(format!("{}-{}.{}", name, n, format.extension()));
    }

    if n > 1 {
        warn!(
            "Output for {} renamed to {} to avoid overwriting",
            source.display(),
            path.display()
        );
    }
    path
}

fn write_output(
    output_path: &Path,
    record: &InvoiceRecord,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            JsonRecordWriter::new(output_path)
                .with_pretty(pretty)
                .write(record)?;
        }
        OutputFormat::Csv | OutputFormat::Text => {
            fs::write(output_path, format_record(record, format, pretty)?)?;
        }
    }

    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "invoice_date",
        "net_amount",
        "gross_amount",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let [number, date, net, gross] = result
            .record
            .as_ref()
            .map(record_fields)
            .unwrap_or_default();

        let time_ms = result.processing_time_ms.to_string();

        wtr.write_record([
            filename,
            result.status(),
            number.as_str(),
            date.as_str(),
            net.as_str(),
            gross.as_str(),
            time_ms.as_str(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
