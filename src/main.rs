use std::path::PathBuf;

use clap::{Parser, Subcommand};
use steel_ingest::model::Supplier;
use steel_ingest::pipeline;
use steel_ingest::segment::DEFAULT_DENSITY_THRESHOLD;
use steel_ingest::{IngestError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| IngestError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Summarize(args) => execute_summarize(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let inputs: Vec<(Supplier, PathBuf)> = args
        .sources
        .into_iter()
        .map(|source| (source.supplier, source.path))
        .collect();
    for (_, path) in &inputs {
        if !path.exists() {
            return Err(IngestError::MissingInput(path.clone()));
        }
    }

    let report = pipeline::run(&inputs, args.threshold)?;
    pipeline::export(&report, &args.output, args.json.as_deref())?;
    info!(
        order_info = report.order_info.len(),
        metadata = report.metadata.len(),
        merged = report.merged.len(),
        output = %args.output.display(),
        "report written"
    );
    Ok(())
}

fn execute_summarize(args: SummarizeArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(IngestError::MissingInput(args.input));
    }

    println!("File: {}", args.input.display());
    for summary in pipeline::summarize(&args.input, args.threshold)? {
        println!("\n--- {} ---", summary.sheet);
        if let Some(error) = &summary.error {
            println!("Segmentation failed: {error}");
            continue;
        }
        println!("Number of tables: {}", summary.table_rows.len());
        for (index, rows) in summary.table_rows.iter().enumerate() {
            println!("Table {}: {rows} rows", index + 1);
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract order and material records from supplier steel inventory workbooks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, join, and export records from supplier workbooks.
    Run(RunArgs),
    /// Print the tables detected in each sheet of a workbook.
    Summarize(SummarizeArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Supplier workbook as `<supplier>=<path>`, e.g. `source1=./source1.xlsx`.
    #[arg(long = "source", value_parser = parse_source, required = true)]
    sources: Vec<SourceArg>,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON copy of the report.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Row density change that marks a table boundary.
    #[arg(long, default_value_t = DEFAULT_DENSITY_THRESHOLD)]
    threshold: usize,
}

#[derive(clap::Args)]
struct SummarizeArgs {
    /// Input workbook path.
    #[arg(long)]
    input: PathBuf,

    /// Row density change that marks a table boundary.
    #[arg(long, default_value_t = DEFAULT_DENSITY_THRESHOLD)]
    threshold: usize,
}

#[derive(Clone, Debug)]
struct SourceArg {
    supplier: Supplier,
    path: PathBuf,
}

fn parse_source(value: &str) -> std::result::Result<SourceArg, String> {
    let (supplier, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <supplier>=<path>, got '{value}'"))?;
    let supplier = supplier.parse::<Supplier>().map_err(|error| error.to_string())?;
    Ok(SourceArg {
        supplier,
        path: PathBuf::from(path),
    })
}
