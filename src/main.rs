use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use contentgate::{ContentRecord, Pipeline, PipelineConfig, Target, ValidationOutcome};
use tracing_subscriber::EnvFilter;

/// Validate and normalize model-generated marketing content.
///
/// Prints the rendered record as JSON on stdout. Rejected input prints its
/// diagnostic on stderr and exits with status 1.
#[derive(Debug, Parser)]
#[command(name = "contentgate", version)]
struct Cli {
    /// Publishing target: marketplace, instagram, facebook or pinterest
    #[arg(short, long)]
    target: Target,

    /// Model that produced the output; checked against the allow-list
    #[arg(short, long)]
    model: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    json_logs: bool,

    /// Print the target's default record and exit
    #[arg(long)]
    show_default: bool,

    /// File holding the model output; `-` or nothing reads stdin
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let pipeline = match &cli.config {
        Some(path) => {
            let config = PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            Pipeline::from_config(&config)?
        }
        None => Pipeline::builtin(),
    };

    if cli.show_default {
        print_record(pipeline.default_record(cli.target), cli.target)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = match cli.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            let file =
                File::open(path).with_context(|| format!("opening input {}", path.display()))?;
            process(&pipeline, cli, file)
        }
        _ => process(&pipeline, cli, io::stdin().lock()),
    };

    match outcome {
        ValidationOutcome::Valid(record) => {
            print_record(&record, cli.target)?;
            Ok(ExitCode::SUCCESS)
        }
        ValidationOutcome::Substituted { record, diagnostic } => {
            tracing::info!(
                request_id = %diagnostic.request_id(),
                error_code = diagnostic.error_code(),
                "default record substituted"
            );
            print_record(&record, cli.target)?;
            Ok(ExitCode::SUCCESS)
        }
        ValidationOutcome::Invalid { diagnostic, .. } => {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{}", diagnostic.to_json_string_pretty())?;
            writeln!(stderr, "{}", diagnostic.user_message())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn process<R: io::Read>(pipeline: &Pipeline, cli: &Cli, reader: R) -> ValidationOutcome {
    match &cli.model {
        Some(model) => pipeline.process_reader_from_model(model, reader, cli.target),
        None => pipeline.process_reader(reader, cli.target),
    }
}

fn print_record(record: &ContentRecord, target: Target) -> anyhow::Result<()> {
    let rendered = record.render(target);
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &rendered)?;
    writeln!(stdout)?;
    Ok(())
}
