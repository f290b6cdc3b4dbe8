//! flatvars: Flatten nested Helm values into top-level variables
//!
//! Usage:
//!   # Write values.flat.yaml next to the input
//!   flatvars values.yaml
//!
//!   # Flatten one level deeper and prefix every key
//!   flatvars values.yaml flat.yaml --depth 3 --prefix myApp
//!
//!   # Print JSON to stdout
//!   flatvars values.yaml - --format json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flatvars::flatten::{self, FlatWriter, FlattenConfig, OutputFormat, DEFAULT_DEPTH};
use std::io::stdout;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flatvars")]
#[command(about = "Flat Helm values generator", long_about = None)]
struct Args {
    /// Path to the Helm values YAML file to flatten
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: <input stem>.flat.<format> next to the input, `-` for stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// How many levels of nesting to flatten
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Prefix to add to the flattened variables
    #[arg(long, default_value = "")]
    prefix: String,

    /// Comma-separated key suffixes whose subtrees are kept intact
    #[arg(long)]
    barrier_keys: Option<String>,

    /// Keep barrier subtrees intact even when depth budget remains
    #[arg(long)]
    strict_barriers: bool,

    /// Maximum input nesting accepted before giving up
    #[arg(long)]
    max_nesting: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Build config
    let mut config = FlattenConfig {
        depth_limit: args.depth,
        prefix: args.prefix,
        strict_barriers: args.strict_barriers,
        ..FlattenConfig::default()
    };
    if let Some(keys_str) = args.barrier_keys {
        config.barrier_keys = keys_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(max_nesting) = args.max_nesting {
        config.max_nesting = max_nesting;
    }
    debug!(?config, "flatten configuration");

    let format = OutputFormat::from(args.format);
    let output = args
        .output
        .unwrap_or_else(|| flatten::default_output_path(&args.input, format));

    if output.as_os_str() == "-" {
        let flat = flatvars::flatten_path(&args.input, config)
            .with_context(|| format!("Failed to flatten {}", args.input.display()))?;
        let mut writer = FlatWriter::new(stdout().lock(), format);
        writer.write_flat(&flat)?;
        writer.flush()?;
    } else {
        let flat = flatvars::flatten_file(&args.input, &output, config, format)
            .with_context(|| format!("Failed to flatten {} into {}", args.input.display(), output.display()))?;
        eprintln!("Wrote {} flattened values to {}", flat.len(), output.display());
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
