use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, ValueHint};
use owo_colors::OwoColorize;
use strata_core::{ConfigLoader, ConfigParser, Extractor, SiteConfig};
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{
    format_size, print_banner, print_field, print_info, print_record_summary, print_step, print_success, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the page record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

impl From<OutputFormat> for strata_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Text => Self::PlainText,
        }
    }
}

/// Extract per-level search records from HTML pages
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author = "Strata Contributors")]
#[command(version)]
#[command(about = "Extract per-level search records from HTML pages", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Site config file (default: ~/.config/strata/config.json, then ./site_configs/config.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL the page was fetched from, used to pick the selectors set
    #[arg(short, long, value_name = "URL", value_hint = ValueHint::Url, value_parser = parse_url)]
    url: Option<String>,

    /// Declared character encoding of the input (default: sniffed from the document)
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Output format (json, text, txt)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_url(value: &str) -> Result<String, String> {
    url::Url::parse(value).map(|_| value.to_string()).map_err(|e| format!("Invalid URL '{}': {}", value, e))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SiteConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading site config");
            ConfigParser::parse_file(path).with_context(|| format!("Failed to load site config: {}", path.display()))
        }
        None => ConfigLoader::default()
            .load()
            .context("No site config found; pass one with --config"),
    }
}

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
        print_step(1, 4, "Loading site config");
    }

    let config = load_config(args.config.as_deref())?;
    let extractor = Extractor::new(config);

    if args.verbose {
        let url = args.url.as_deref();
        print_field("Selectors", extractor.resolve_selectors_key(url));
        print_field("Min level", &extractor.resolve_min_indexed_level(url).to_string());
        eprintln!();

        let source = if args.input == "-" { "stdin".to_string() } else { format!("file {}", args.input) };
        print_step(2, 4, &format!("Reading from {}", source.bright_white()));
    }

    let raw = read_input(&args.input)?;

    if args.verbose {
        print_field("Size", &format_size(raw.len()));
        print_field("Encoding", args.encoding.as_deref().unwrap_or("sniffed"));
        eprintln!();
        print_step(3, 4, "Extracting levels");
    }

    let record = extractor
        .extract_page(&raw, args.encoding.as_deref(), args.url.as_deref())
        .context("Failed to extract page")?;
    tracing::debug!(
        selectors_key = %record.selectors_key,
        levels = record.levels.len(),
        indexable = record.is_indexable(),
        "extracted page"
    );

    if args.verbose {
        print_record_summary(&record);
        if !record.is_indexable() {
            print_warning("Page does not reach its minimum indexed level");
        }
        print_step(4, 4, "Writing output");
        print_field("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    let mut output = record.to_format(args.format.into()).context("Failed to render record")?;
    output.push('\n');

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
