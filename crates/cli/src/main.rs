//! `valence-cli` -- evaluate a batch of metric series from the command line.
//!
//! Reads a batch document (see [`valence_cli::batch`]), scores every metric,
//! and writes the results as pretty JSON to stdout. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default | Description                               |
//! |---------------------------|----------|---------|-------------------------------------------|
//! | `VALENCE_INPUT`           | yes*     | --      | Batch document path; the first argument overrides it |
//! | `VALENCE_PIPELINE_CONFIG` | no       | --      | Pipeline config JSON used for every metric |
//! | `RUST_LOG`                | no       | `valence_cli=info,valence_pipeline=info` | Log filter |

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valence_cli::batch;
use valence_cli::config::CliConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valence_cli=info,valence_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CliConfig::from_env(std::env::args().nth(1))?;
    tracing::info!(
        input = %config.input.display(),
        pipeline_config = ?config.pipeline_config,
        "Starting valence-cli",
    );

    let pipeline = config
        .pipeline_config
        .as_deref()
        .map(batch::load_pipeline_config)
        .transpose()?;
    let input = batch::load_batch(&config.input)?;
    let output = batch::run_batch(input, pipeline)?;

    let rendered = serde_json::to_string_pretty(&output).context("failed to render results")?;
    println!("{rendered}");
    Ok(())
}
