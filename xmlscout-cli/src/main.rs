mod prompt;
mod terminal;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xmlscout::{
    config::CliOverrides, copy_matches, copy_matches_with_progress, generate::generate_documents,
    load_seed, parse_selection, CopyReport, NullSink, ProgressSink, ScanConfig, ScanError,
    ScanOutcome, Scanner, SearchPredicate, XmlDocumentParser,
};

use crate::prompt::Prompter;
use crate::terminal::TerminalSink;

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Directory holding the documents to scan
    #[arg(short = 'd', long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving copies of matching documents
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Seed document whose fields can be searched, relative to the input directory
    #[arg(short, long)]
    seed: Option<String>,

    /// Numbers of the fields to search, separated by commas (e.g. 1,3)
    #[arg(short, long)]
    fields: Option<String>,

    /// Value to search for, once per selected field and in the same order
    #[arg(short = 'v', long = "value")]
    values: Vec<String>,

    /// Number of threads to use
    #[arg(short = 'j', long, conflicts_with = "single_threaded")]
    threads: Option<NonZeroUsize>,

    /// Scan on a single worker
    #[arg(long)]
    single_threaded: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Do not redraw progress while scanning
    #[arg(long)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find documents with a record matching every selected field value
    Search(Box<CliSearchConfig>),

    /// List the searchable fields of a seed document
    Fields {
        /// Seed document, relative to the input directory
        #[arg(short, long)]
        seed: String,

        /// Directory holding the documents
        #[arg(short = 'd', long)]
        input_dir: Option<PathBuf>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write sample stock documents to scan
    Generate {
        /// Number of documents to write
        #[arg(short = 'n', long, default_value = "1000")]
        count: usize,

        /// Target directory (defaults to the configured input directory)
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Random seed for reproducible documents
        #[arg(long)]
        seed: Option<u64>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => run_search(*args),
        Commands::Fields {
            seed,
            input_dir,
            config,
        } => {
            let config = setup(
                config.as_deref(),
                CliOverrides {
                    input_dir,
                    ..Default::default()
                },
            )?;

            let parser = XmlDocumentParser::from_config(&config);
            let fields = load_seed(&parser, &config.input_dir.join(seed))?;
            println!("Searchable fields in the XML file:");
            for (i, field) in fields.iter().enumerate() {
                println!("{}. {}", (i + 1).to_string().green(), field);
            }
            Ok(())
        }
        Commands::Generate {
            count,
            output_dir,
            seed,
            config,
        } => {
            let config = setup(config.as_deref(), CliOverrides::default())?;

            let output_dir = output_dir.unwrap_or(config.input_dir);
            let written = generate_documents(&output_dir, count, seed)?;
            println!(
                "{} XML files have been generated in {}",
                written.len(),
                output_dir.display()
            );
            Ok(())
        }
    }
}

fn run_search(args: CliSearchConfig) -> Result<()> {
    let config = setup(
        args.config.as_deref(),
        CliOverrides {
            input_dir: args.input_dir,
            output_dir: args.output_dir,
            worker_count: args.threads,
            log_level: args.log_level,
        },
    )?;

    // Keep stdout clean for the JSON report
    let prompt_output: Box<dyn Write> = if args.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut prompter = Prompter::new(io::stdin().lock(), prompt_output);

    let seed = match args.seed {
        Some(seed) => seed,
        None => prompter.ask_seed()?,
    };
    let parser = XmlDocumentParser::from_config(&config);
    let fields = load_seed(&parser, &config.input_dir.join(seed))?;

    let selection = match args.fields {
        Some(fields_arg) => parse_selection(&fields_arg, fields.len())?,
        None => prompter.ask_fields(&fields)?,
    };

    let values = if args.values.is_empty() {
        prompter.ask_values(&fields, &selection)?
    } else if args.values.len() != selection.len() {
        return Err(ScanError::invalid_selection(format!(
            "{} field(s) selected but {} value(s) given",
            selection.len(),
            args.values.len()
        )));
    } else {
        args.values
    };

    let worker_count = if args.threads.is_some() {
        config.worker_count
    } else if args.single_threaded {
        NonZeroUsize::MIN
    } else if prompter.ask_multithreaded()? {
        prompter.ask_worker_count(num_cpus::get())?
    } else {
        NonZeroUsize::MIN
    };

    let predicate = SearchPredicate::new(fields, selection.into_iter().zip(values).collect())?;
    let scanner = Scanner::from_config(&config)?.with_workers(worker_count);

    let quiet = args.json || args.no_progress;
    let sink: Box<dyn ProgressSink> = if quiet {
        Box::new(NullSink)
    } else {
        Box::new(TerminalSink::new())
    };

    let outcome = scanner.scan(&config.input_dir, &predicate, sink.as_ref())?;
    let report = if quiet {
        copy_matches(&outcome.matches, &config.output_dir)?
    } else {
        copy_matches_with_progress(&outcome.matches, &config.output_dir)?
    };
    info!(
        files_copied = report.files_copied(),
        copy_failures = report.failed.len(),
        output_dir = %config.output_dir.display(),
        "Copy stage finished"
    );

    if args.json {
        print_json_report(&outcome, &report, &config.output_dir)?;
    } else {
        print_summary(&outcome, &report, &config.output_dir);
    }
    Ok(())
}

/// Loads and merges the configuration, then installs logging at its level
fn setup(path: Option<&Path>, overrides: CliOverrides) -> Result<ScanConfig> {
    let config = ScanConfig::load_from(path)
        .map_err(|e| ScanError::config_error(e.to_string()))?
        .merge_with_cli(overrides);
    init_tracing(&config.log_level);
    debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Logs go to stderr so they never interleave with the status display.
/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(outcome: &ScanOutcome, report: &CopyReport, output_dir: &Path) {
    for (path, reason) in &report.failed {
        eprintln!(
            "{} {}: {}",
            "Failed to copy".red(),
            path.display(),
            reason
        );
    }
    if outcome.files_failed > 0 {
        println!(
            "\n{} files could not be parsed and were skipped.",
            outcome.files_failed.to_string().yellow()
        );
    }

    println!("\nScanned {} files.", outcome.files_scanned);
    println!(
        "Copied {} matching files to {}",
        report.files_copied().to_string().green(),
        output_dir.display()
    );
    println!(
        "Finished in {}",
        humantime::format_duration(outcome.elapsed)
    );
}

fn print_json_report(outcome: &ScanOutcome, report: &CopyReport, output_dir: &Path) -> Result<()> {
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|(path, reason)| json!({ "path": path, "reason": reason }))
        .collect();
    let value = json!({
        "files_scanned": outcome.files_scanned,
        "files_failed": outcome.files_failed,
        "files_matched": outcome.files_matched(),
        "files_copied": report.files_copied(),
        "output_dir": output_dir,
        "matches": outcome.matches,
        "copy_failures": failed,
        "elapsed_secs": outcome.elapsed.as_secs_f64(),
        "workers": outcome.workers,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
