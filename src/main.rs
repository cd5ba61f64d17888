use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod checks;
mod cli;
mod commands;
mod completeness;
mod config;
mod containers;
mod context;
mod coordinator;
mod environment;
mod inputs;
mod job_file;
mod layout;
mod manifest;
mod progress;
mod runner;
mod sample_list;
mod selection;
mod templates;

use cli::{Command, RootArgs};

fn init_tracing(verbose: bool) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive("jobmanager=debug".parse()?);
    }
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose())?;

    match &args.command {
        Command::Run(args) => commands::run(args),
        Command::DryRun(args) => commands::dry_run(args),
        Command::ShowJobProgress(args) => commands::show_job_progress(args),
        Command::PullContainerImages(args) => commands::pull_images(args),
        Command::DisplayJobmanagerRecognition(args) => {
            commands::display_jobmanager_recognition(args)
        }
        Command::GenerateSampleList(args) => commands::generate_sample_list(args),
    }
}
