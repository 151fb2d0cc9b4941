//! Command-line interface for shapeshift
//! Converts documents between JSON, YAML, TOML and XML.
//!
//! Usage:
//!   shapeshift convert [`<path>`] [--from `<fmt>`] [--to `<fmt>`] [--config `<file>`]
//!   shapeshift check [`<path>`]                    - JSON syntax check
//!   shapeshift formats                             - List available formats
//!
//! Without a path (or with `-`) input is read from stdin. Output always goes to stdout.

use clap::{Arg, ArgAction, ArgMatches, Command};
use shapeshift::formats::json;
use shapeshift::{FormatError, FormatRegistry, Transfer};
use shapeshift_config::{Loader, ShapeshiftConfig};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("configuration: {0}")]
    Config(#[from] shapeshift_config::ConfigError),
    #[error("{path}: {source}")]
    Input { path: String, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("convert", sub)) => handle_convert_command(sub),
        Some(("check", sub)) => handle_check_command(sub),
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!("clap requires a subcommand"),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    Command::new("shapeshift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents between JSON, YAML, TOML and XML")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion steps to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document from one format to another")
                .arg(
                    Arg::new("path")
                        .help("Input file, '-' or absent for stdin")
                        .index(1),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .help("Source format (default: from the file extension, then config)"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Target format (default: from config)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the built-in defaults"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check that a document is well-formed JSON")
                .arg(
                    Arg::new("path")
                        .help("Input file, '-' or absent for stdin")
                        .index(1),
                ),
        )
        .subcommand(Command::new("formats").about("List available formats"))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&String>) -> Result<ShapeshiftConfig, CliError> {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    Ok(loader.build()?)
}

fn open_input(path: Option<&str>) -> Result<Box<dyn BufRead>, CliError> {
    match path {
        None | Some("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Input {
                path: path.to_string(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Pick the source format: explicit flag, then the input's extension, then config.
fn source_format(
    explicit: Option<&String>,
    path: Option<&str>,
    registry: &FormatRegistry,
    config: &ShapeshiftConfig,
) -> String {
    if let Some(name) = explicit {
        return name.clone();
    }
    let inferred = path
        .and_then(|p| Path::new(p).extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| registry.for_extension(ext))
        .map(|format| format.name().to_string());
    match inferred {
        Some(name) => {
            tracing::debug!("inferred source format '{name}' from extension");
            name
        }
        None => config.convert.from.clone(),
    }
}

fn handle_convert_command(matches: &ArgMatches) -> Result<ExitCode, CliError> {
    let config = load_config(matches.get_one::<String>("config"))?;
    let registry = config.registry();

    let path = matches.get_one::<String>("path").map(String::as_str);
    let from = source_format(matches.get_one::<String>("from"), path, &registry, &config);
    let to = matches
        .get_one::<String>("to")
        .cloned()
        .unwrap_or_else(|| config.convert.to.clone());

    let transfer = Transfer::new(&registry, from, to);
    // Resolve names before opening anything so a typo never blocks on stdin
    registry.get(transfer.source_format())?;
    registry.get(transfer.target_format())?;

    let input = open_input(path)?;
    let stdout = io::stdout();
    let mut output = io::BufWriter::new(stdout.lock());
    transfer.exchange_stream(input, &mut output)?;
    output.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn handle_check_command(matches: &ArgMatches) -> Result<ExitCode, CliError> {
    let path = matches.get_one::<String>("path").map(String::as_str);
    let mut payload = Vec::new();
    open_input(path)?.read_to_end(&mut payload)?;

    match json::check(&payload) {
        Ok(()) => {
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_formats_command() -> Result<ExitCode, CliError> {
    let registry = FormatRegistry::with_defaults();
    for name in registry.list_formats() {
        let format = registry.get(&name)?;
        println!(
            "{:<6} {} (.{})",
            name,
            format.description(),
            format.file_extensions().join(", .")
        );
    }
    Ok(ExitCode::SUCCESS)
}
