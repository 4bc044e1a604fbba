//! Recap - summarize recently modified files in a folder with an LLM.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use recap_chat::{Backend, LLMConfig};
use recap_runtime::Analyzer;

mod args;
mod output;
mod setup;

use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env from the current directory, if any
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e
                .downcast_ref::<recap_core::Error>()
                .is_some_and(recap_core::Error::is_backend)
            {
                eprintln!("Check the backend with `recap --test-connection`, or see `recap --setup`.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.setup {
        print!("{}", setup::instructions(args.backend.map(Into::into)));
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = LLMConfig::load(args.config.as_deref())?;
    config.apply_overrides(&args.overrides());

    if args.test_connection {
        return Ok(test_connection(&config).await);
    }

    let Some(folder) = args.folder.clone() else {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "FOLDER is required unless --setup or --test-connection is given",
            )
            .exit();
    };

    let settings = args.settings();
    debug!("Settings: {:?}", settings);

    let backend = Backend::from_config(&config)?;
    let analyzer = Analyzer::new(settings, backend);

    println!(
        "Analyzing files in {} modified in the last {} days...",
        folder.display(),
        args.days
    );

    let collected = analyzer.collect(&folder)?;
    let pending = analyzer.submit(&collected);
    output::print_summary(&collected, args.days);

    let report = analyzer.finish(collected, pending).await?;
    output::print_analysis(&report);

    if let Some(path) = &args.output {
        report.save(path)?;
        println!();
        println!("Saved results to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

async fn test_connection(config: &LLMConfig) -> ExitCode {
    let backend = match Backend::from_config(config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Testing {}", backend.describe());
    match backend.test_connection().await {
        Ok(report) => {
            println!(
                "Connection OK: {} at {} (model {})",
                report.backend, report.endpoint, report.model
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
