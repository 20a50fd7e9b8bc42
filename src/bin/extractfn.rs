//! extractfn CLI - build extraction functions from a config file and apply them
//!
//! Reads values from the command line or stdin and prints one result per line.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use extractfn::{ExtractionConfig, ExtractionError, ExtractionFn, ExtractionFnRegistry, Result};

#[derive(Parser)]
#[command(name = "extractfn")]
#[command(version, about = "Build and apply extraction functions from YAML configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an extraction function to values (stdin lines if none are given)
    Apply {
        /// Path to extraction function config file
        #[arg(short, long, default_value = "extraction_fns.yaml")]
        config: PathBuf,

        /// Name of the extraction function to apply
        #[arg(short, long)]
        name: String,

        /// Parse each value as JSON instead of treating it as a string
        #[arg(long)]
        json: bool,

        /// Values to transform
        values: Vec<String>,
    },

    /// Print cache keys as hex
    CacheKey {
        /// Path to extraction function config file
        #[arg(short, long, default_value = "extraction_fns.yaml")]
        config: PathBuf,

        /// Only print the key for this extraction function
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Build every extraction function in a config file without applying it
    Validate {
        /// Path to extraction function config file
        #[arg(short, long, default_value = "extraction_fns.yaml")]
        config: PathBuf,
    },

    /// List registered extraction function types
    Types,
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = ExtractionFnRegistry::with_builtins();

    let result = match cli.command {
        Commands::Apply {
            config,
            name,
            json,
            values,
        } => apply(&registry, &config, &name, json, values),
        Commands::CacheKey { config, name } => cache_key(&registry, &config, name.as_deref()),
        Commands::Validate { config } => validate(&registry, &config),
        Commands::Types => {
            for name in registry.list_types() {
                println!("{}", name);
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn apply(
    registry: &ExtractionFnRegistry,
    config_path: &Path,
    name: &str,
    json: bool,
    values: Vec<String>,
) -> Result<()> {
    let config = ExtractionConfig::load_from_file(config_path)?;
    let f = config.build(name, registry)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if values.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.map_err(|e| {
                ExtractionError::Evaluation(format!("Failed to read stdin: {}", e))
            })?;
            print_result(&mut out, f.as_ref(), &parse_input(&line, json)?)?;
        }
    } else {
        for value in &values {
            print_result(&mut out, f.as_ref(), &parse_input(value, json)?)?;
        }
    }

    Ok(())
}

fn parse_input(raw: &str, json: bool) -> Result<Value> {
    if json {
        serde_json::from_str(raw).map_err(|e| {
            ExtractionError::Configuration(format!("Invalid JSON value '{}': {}", raw, e))
        })
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

fn print_result(out: &mut impl Write, f: &dyn ExtractionFn, input: &Value) -> Result<()> {
    let line = f.apply(input)?.unwrap_or_else(|| "null".to_string());
    writeln!(out, "{}", line).map_err(|e| {
        ExtractionError::Evaluation(format!("Failed to write output: {}", e))
    })
}

fn cache_key(registry: &ExtractionFnRegistry, config_path: &Path, name: Option<&str>) -> Result<()> {
    let config = ExtractionConfig::load_from_file(config_path)?;

    let fns: Vec<(String, Arc<dyn ExtractionFn>)> = match name {
        Some(name) => vec![(name.to_string(), config.build(name, registry)?)],
        None => config.build_all(registry)?.into_iter().collect(),
    };

    for (name, f) in fns {
        println!("{}\t{}", name, to_hex(&f.cache_key()));
    }

    Ok(())
}

fn validate(registry: &ExtractionFnRegistry, config_path: &Path) -> Result<()> {
    let config = ExtractionConfig::load_from_file(config_path)?;
    let fns = config.build_all(registry)?;

    for (name, f) in &fns {
        println!(
            "  ✓ {} ({}, {}, preserves ordering: {})",
            name,
            f.type_name(),
            f.extraction_type(),
            f.preserves_ordering()
        );
    }
    println!("\n{} extraction functions valid", fns.len());

    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
