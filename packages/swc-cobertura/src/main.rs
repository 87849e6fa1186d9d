use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use swc_cobertura_instrument::{InstrumentLogOptions, InstrumentOptions};

mod excludes;
mod instrument_files;
mod logging;
mod paths;
mod report;

use excludes::{normalize_patterns, Excludes};
use instrument_files::InstrumentFiles;
use logging::initialize_instrumentation_log;

/// Cobertura line and branch coverage for JavaScript.
#[derive(Parser)]
#[command(name = "swc-cobertura", version, about)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). Defaults to info.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument JavaScript files into an output directory.
    Instrument {
        /// Directory receiving the instrumented files.
        #[arg(short, long)]
        output: PathBuf,

        /// Descend into directories.
        #[arg(short, long)]
        recursive: bool,

        /// File name or glob to leave out. Repeatable.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// JSON file holding instrumentation options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Name of the coverage registry global.
        #[arg(long)]
        coverage_variable: Option<String>,

        /// Expression naming the global object holding the registry.
        #[arg(long)]
        global_scope: Option<String>,

        /// Path the instrumented program dumps the registry to on exit.
        #[arg(long)]
        dump_file: Option<String>,

        /// Files and directories to instrument.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Write a Cobertura XML report from a registry dump.
    Report {
        /// Registry dump written by the instrumented program.
        #[arg(long)]
        input: PathBuf,

        /// Source directory listed in the report.
        #[arg(long, default_value = ".")]
        srcdir: String,

        /// Report file to write.
        #[arg(short, long, default_value = "coverage.xml")]
        output: PathBuf,
    },
}

fn load_options(config: Option<&PathBuf>) -> Result<InstrumentOptions> {
    match config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(InstrumentOptions::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Instrument {
            output,
            recursive,
            exclude,
            config,
            coverage_variable,
            global_scope,
            dump_file,
            paths,
        } => {
            let mut instrument_options = load_options(config.as_ref())?;
            if let Some(coverage_variable) = coverage_variable {
                instrument_options.coverage_variable = coverage_variable;
            }
            if let Some(global_scope) = global_scope {
                instrument_options.coverage_global_scope = global_scope;
            }
            if dump_file.is_some() {
                instrument_options.coverage_dump_file = dump_file;
            }
            if cli.log_level.is_some() {
                instrument_options.instrument_log.level = cli.log_level;
            }
            if instrument_options.instrument_log.level.is_none() {
                instrument_options.instrument_log.level = Some("info".to_string());
            }
            initialize_instrumentation_log(&instrument_options.instrument_log);

            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            let patterns = normalize_patterns(&exclude);
            let excludes = Excludes::new(&patterns);

            let summary = InstrumentFiles {
                output_dir: &output,
                cwd: &cwd,
                recursive,
                excludes: &excludes,
                instrument_options: &instrument_options,
            }
            .run(&paths);

            if summary.failed > 0 {
                bail!("{} file(s) could not be instrumented", summary.failed);
            }
        }
        Commands::Report {
            input,
            srcdir,
            output,
        } => {
            let log_options = InstrumentLogOptions {
                level: Some(cli.log_level.unwrap_or_else(|| "info".to_string())),
                enable_trace: false,
            };
            initialize_instrumentation_log(&log_options);

            report::write_report(&input, &srcdir, &output)?;
        }
    }

    Ok(())
}
