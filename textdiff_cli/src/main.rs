use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use textdiff_align::LevenshteinAligner;
use textdiff_report::{
    MarkupConverter, PlainText, ReportFormat, ReportOptions, TagStripper, TextDiff, diff_texts,
    diff_with_script, write_report,
};
use textdiff_script::EditScript;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "text-diff")]
#[command(about = "Compare two text files and print a context-windowed diff report")]
struct Cli {
    /// Target text (A); the report shows how B becomes A.
    file_a: PathBuf,
    /// Source text (B).
    file_b: PathBuf,

    #[arg(long, value_enum, default_value_t = CliFormat::Markdown)]
    format: CliFormat,

    #[arg(long)]
    json: bool,

    #[arg(long)]
    html: bool,

    /// Replay this run-length edit script instead of aligning the files.
    #[arg(long)]
    script: Option<String>,

    /// JSON file with report options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    context_threshold: Option<usize>,

    #[arg(long)]
    context_width: Option<usize>,

    /// Strip markup tags from fragments before display.
    #[arg(long)]
    strip_markup: bool,

    /// Write the report to a file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Markdown,
    Html,
    Json,
    OpsJson,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let a_text = fs::read_to_string(&cli.file_a)?;
    let b_text = fs::read_to_string(&cli.file_b)?;
    let options = load_options(&cli)?;
    debug!(?options, "resolved report options");

    let diff = compute_diff(&cli, &a_text, &b_text, options)?;
    info!(
        edit_distance = diff.edit_distance,
        blocks = diff.blocks.len(),
        "diff computed"
    );

    let converter: &dyn MarkupConverter = if cli.strip_markup {
        &TagStripper
    } else {
        &PlainText
    };
    let format = report_format(&cli);
    let a_label = cli.file_a.display().to_string();
    let b_label = cli.file_b.display().to_string();

    match &cli.output {
        Some(path) => write_report(
            &mut File::create(path)?,
            &diff,
            format,
            &a_label,
            &b_label,
            converter,
        )?,
        None => write_report(
            &mut io::stdout().lock(),
            &diff,
            format,
            &a_label,
            &b_label,
            converter,
        )?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(cli: &Cli) -> Result<ReportOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => ReportOptions::default(),
    };
    if let Some(threshold) = cli.context_threshold {
        options = options.with_context_threshold(threshold);
    }
    if let Some(width) = cli.context_width {
        options = options.with_context_width(width);
    }
    Ok(options)
}

fn compute_diff(
    cli: &Cli,
    a_text: &str,
    b_text: &str,
    options: ReportOptions,
) -> Result<TextDiff, Box<dyn std::error::Error>> {
    let diff = match &cli.script {
        Some(raw) => {
            let script = EditScript::try_parse(raw)?;
            diff_with_script(a_text, b_text, &script, options)?
        }
        None => diff_texts(a_text, b_text, &LevenshteinAligner, options)?,
    };
    Ok(diff)
}

fn report_format(cli: &Cli) -> ReportFormat {
    if cli.json {
        return ReportFormat::Json;
    }
    if cli.html {
        return ReportFormat::Html;
    }
    match cli.format {
        CliFormat::Markdown => ReportFormat::Markdown,
        CliFormat::Html => ReportFormat::Html,
        CliFormat::Json => ReportFormat::Json,
        CliFormat::OpsJson => ReportFormat::Operations,
    }
}
