//! annotation-gateway: command line access to annotation table servers and
//! document gateway packaging.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use annotation_gateway::client::AnnotationStoreClient;
use annotation_gateway::config::{self, Config};
use annotation_gateway::packer::Packer;

/// Client for annotation table servers and document gateway packaging.
#[derive(Parser, Debug)]
#[command(name = "annotation-gateway")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the annotation types hosted by the server
    Types,

    /// Fetch the annotations of one type as tab-separated lines
    Annotations {
        /// Annotation type to fetch
        #[arg(value_name = "TYPE")]
        annotation_type: String,

        /// GPath predicate the server filters the annotations with
        #[arg(short, long)]
        predicate: Option<String>,
    },

    /// Build the document gateway zip archive
    Pack {
        /// Project root (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Configuration to package (defaults to the configured one)
        #[arg(long, value_name = "NAME")]
        configuration: Option<String>,
    },
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats an error with its chain of sources.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create Tokio runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

fn run_types(cfg: &Config) -> Result<(), String> {
    let client = AnnotationStoreClient::from_config(&cfg.server).map_err(|e| error_chain(&e))?;
    info!(address = %cfg.server.address, "Listing annotation types");

    let types = block_on(client.list_annotation_types())?.map_err(|e| error_chain(&e))?;
    for annotation_type in types {
        println!("{annotation_type}");
    }
    Ok(())
}

fn run_annotations(
    cfg: &Config,
    annotation_type: &str,
    predicate: Option<&str>,
) -> Result<(), String> {
    let client = AnnotationStoreClient::from_config(&cfg.server).map_err(|e| error_chain(&e))?;
    info!(address = %cfg.server.address, annotation_type, "Fetching annotations");

    let annotations = block_on(client.fetch_annotations(annotation_type, predicate))?
        .map_err(|e| error_chain(&e))?;
    for annotation in annotations {
        let mut line = annotation.value().to_string();
        for (name, value) in annotation.attributes() {
            line.push('\t');
            line.push_str(name);
            line.push('=');
            line.push_str(value);
        }
        println!("{line}");
    }
    Ok(())
}

fn run_pack(
    cfg: &Config,
    root: Option<PathBuf>,
    configuration: Option<String>,
) -> Result<(), String> {
    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let mut packer = Packer::new(root, &cfg.packer);
    if let Some(name) = configuration {
        packer = packer.with_configuration(name);
    }
    info!(configuration = packer.configuration(), "Configuration selected for zipping");

    let report = packer.pack().map_err(|e| {
        format!(
            "An error occurred creating the document gateway zip file:\n{}",
            error_chain(&e)
        )
    })?;

    if let Some(backup) = &report.backup {
        println!("Previous archive moved to '{}'", backup.display());
    }
    println!(
        "Document gateway zip file '{}' created successfully ({} entries).",
        report.archive.display(),
        report.entries.len()
    );
    Ok(())
}

/// Entry point for the annotation-gateway tool.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", error_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting annotation-gateway");

    let result = match args.command {
        Command::Pack {
            root,
            configuration,
        } => run_pack(&cfg, root, configuration),
        Command::Types => run_types(&cfg),
        Command::Annotations {
            annotation_type,
            predicate,
        } => run_annotations(&cfg, &annotation_type, predicate.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_config_level() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "INFO"), Level::INFO);
        assert_eq!(get_log_level(0, false, "chatty"), Level::WARN);
    }

    #[test]
    fn parses_annotations_subcommand() {
        let args = Args::try_parse_from([
            "annotation-gateway",
            "annotations",
            "taxonomicName",
            "--predicate",
            "[@rank = 'species']",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Annotations { ref annotation_type, predicate: Some(_) }
                if annotation_type == "taxonomicName"
        ));
    }
}
