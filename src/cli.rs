//! CLI argument parsing for the job manager.
//!
//! Every command takes the sample sheet and the reference config as its two
//! positional inputs; flags only tune how the batch is checked or executed.
use crate::environment::DEFAULT_RUNNER;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "jobmanager",
    version,
    about = "Run a per-sample CWL workflow over every unfinished sample of a sample sheet",
    after_help = "Examples:\n  jobmanager run samplesheet.json configfile.json\n  jobmanager run --dry-run samplesheet.json configfile.json\n  jobmanager show-job-progress --only-new samplesheet.json configfile.json\n  jobmanager pull-container-images --singularity samplesheet.json configfile.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    DryRun(DryRunArgs),
    ShowJobProgress(ShowJobProgressArgs),
    PullContainerImages(PullContainerImagesArgs),
    #[command(name = "display-jobmanager-recognition")]
    DisplayJobmanagerRecognition(RecognitionArgs),
    GenerateSampleList(GenerateSampleListArgs),
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Run(args) => args.execution.verbose,
            Command::DryRun(args) => args.execution.verbose,
            Command::ShowJobProgress(args) => args.verbose,
            Command::GenerateSampleList(args) => args.verbose,
            Command::PullContainerImages(_) | Command::DisplayJobmanagerRecognition(_) => false,
        }
    }
}

/// The two input documents.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Sample sheet JSON
    #[arg(value_name = "SAMPLE_SHEET")]
    pub sample_sheet: PathBuf,

    /// Reference configuration JSON
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Checks and runner options shared by `run` and `dry-run`.
#[derive(Args, Debug, Clone)]
pub struct ExecutionArgs {
    /// Check that every FASTQ named in the sample sheet exists
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub file_exists_check: bool,

    /// Verify FASTQ MD5 digests when the sample sheet provides them
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub file_hash_check: bool,

    /// Workflow runner executable
    #[arg(long, value_name = "BIN", default_value = DEFAULT_RUNNER)]
    pub runner: String,

    /// Batch system passed to the runner
    #[arg(long, value_name = "NAME", default_value = "slurm")]
    pub batch_system: String,

    /// Runner retry count for failed jobs
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub retry_count: u32,

    /// Cap on concurrent runner processes (one per pending sample when unset)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub max_parallel: Option<usize>,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Execute the workflow for every unfinished sample")]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// List the samples that would run without executing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub execution: ExecutionArgs,
}

#[derive(Parser, Debug)]
#[command(about = "List the samples that would run without executing anything")]
pub struct DryRunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub execution: ExecutionArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Show finished samples and diagnose unfinished ones")]
pub struct ShowJobProgressArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Only show samples that still need to run
    #[arg(long, conflicts_with = "only_finished")]
    pub only_new: bool,

    /// Only show finished samples
    #[arg(long)]
    pub only_finished: bool,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Cache the container images referenced by the workflow")]
#[command(group(ArgGroup::new("runtime").required(true).args(["singularity", "docker"])))]
pub struct PullContainerImagesArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Build singularity images
    #[arg(long)]
    pub singularity: bool,

    /// Save docker images as tarballs
    #[arg(long)]
    pub docker: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Show the environment and tools the job manager recognizes")]
pub struct RecognitionArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Workflow runner executable
    #[arg(long, value_name = "BIN", default_value = DEFAULT_RUNNER)]
    pub runner: String,
}

#[derive(Parser, Debug)]
#[command(about = "Write the sample id list to <output>/sample_list.yaml")]
pub struct GenerateSampleListArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}
