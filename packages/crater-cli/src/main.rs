//! `crater` - generate RO-Crate metadata for a notebook directory, package it,
//! and optionally deposit it on Zenodo.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use crater::ai::{OllamaEmbedder, OllamaGenerator};
use crater::{Depositor, Pipeline, PublishState, SynthesisRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crater=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config();

    // Fail on a bad directory before loading any model
    let request = SynthesisRequest::from_directory(&cli.directory)
        .with_context(|| format!("Cannot read {}", cli.directory.display()))?;

    if cli.publish && !cli.upload {
        tracing::warn!("--publish has no effect without --upload");
    }
    let depositor = if cli.upload {
        Some(Depositor::from_config(&config).context("Cannot prepare the upload")?)
    } else {
        None
    };

    let pipeline = Pipeline::build(
        config.clone(),
        OllamaEmbedder::from_config(&config),
        OllamaGenerator::from_config(&config),
    )
    .await
    .context("Failed to index reference documents")?;

    let outcome = pipeline
        .synthesize(&request)
        .await
        .context("Failed to synthesize RO-Crate metadata")?;

    println!(
        "{} {} ({} entities, root {})",
        "✓ Packaged".bright_green().bold(),
        outcome.archive_path.display(),
        outcome.entity_count,
        outcome.root_id
    );

    let Some(depositor) = depositor else {
        return Ok(());
    };

    let record = depositor
        .upload(&outcome.archive_path, cli.publish)
        .await
        .context("Deposition failed")?;

    match record.publish_state {
        PublishState::Published => println!(
            "{} deposition {} with DOI {}",
            "✓ Published".bright_green().bold(),
            record.id,
            record.doi.as_deref().unwrap_or("-")
        ),
        PublishState::Draft => println!(
            "{} draft deposition {} {}",
            "✓ Uploaded".bright_green().bold(),
            record.id,
            record.upload_url.as_deref().unwrap_or("")
        ),
    }
    Ok(())
}
