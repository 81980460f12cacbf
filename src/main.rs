use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;

pub mod aggregate;
pub mod error;
pub mod log_record;
pub mod partition;
pub mod pipeline;
pub mod report;

use error::BatchError;
use pipeline::{Pipeline, PipelineConfig};
use report::OutputFormat;

/// Batch analytics over comma-delimited HTTP access logs.
#[derive(Debug, Parser)]
#[command(name = "loganalytics", version, about)]
struct Cli {
    /// Input log file, one `ip,timestamp,url,status,user_agent` per line.
    input: PathBuf,

    /// How many URLs the top-URL ranking keeps.
    #[arg(long, default_value_t = 10)]
    top_urls: usize,

    /// Report an address only when it has strictly more failures than this.
    #[arg(long, default_value_t = aggregate::DEFAULT_MIN_FAILED)]
    min_failed: u64,

    /// Status codes counted as failures.
    #[arg(long = "failed-status", value_name = "STATUS", default_values_t = aggregate::DEFAULT_FAILED_STATUSES)]
    failed_statuses: Vec<u16>,

    /// Mask the last segment of every client address before aggregating.
    #[arg(long)]
    anonymize: bool,

    /// Emit the report as pretty JSON instead of text tables.
    #[arg(long)]
    json: bool,

    /// Write the report to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            top_urls: self.top_urls,
            failed_statuses: self.failed_statuses.clone(),
            min_failed: self.min_failed,
            anonymize: self.anonymize,
        }
    }

    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

async fn run(cli: Cli) -> Result<(), BatchError> {
    let mut pipeline = Pipeline::new(cli.pipeline_config());
    let batch = pipeline.run_file(&cli.input).await?;

    match &cli.output {
        Some(path) => {
            let target = path.display().to_string();
            let file = File::create(path).map_err(|source| BatchError::Output {
                target: target.clone(),
                source,
            })?;
            let mut out = BufWriter::new(file);
            report::render(&batch, cli.format(), &mut out)
                .map_err(|source| BatchError::Output { target, source })?;
        }
        None => {
            let stdout = io::stdout();
            report::render(&batch, cli.format(), &mut stdout.lock()).map_err(|source| {
                BatchError::Output {
                    target: "stdout".to_owned(),
                    source,
                }
            })?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
