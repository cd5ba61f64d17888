//! Command handlers: load inputs, build the run context and route to the
//! selector, dispatcher and reporter.
use crate::checks::{
    check_config_files, check_reference_secondary_files, check_sample_sheet_files, same_file_path,
    workflow_file_exists,
};
use crate::cli::{
    DryRunArgs, ExecutionArgs, GenerateSampleListArgs, InputArgs, PullContainerImagesArgs,
    RecognitionArgs, RunArgs, ShowJobProgressArgs,
};
use crate::containers::{pull_container_images, ContainerRuntime};
use crate::context::RunContext;
use crate::coordinator::dispatch_all;
use crate::environment::{display_recognition, find_tool, in_virtualenv, runner_env};
use crate::inputs::{load_inputs, Inputs};
use crate::layout::invocation_timestamp;
use crate::progress::{report, ProgressFilter};
use crate::runner::RunnerSettings;
use crate::sample_list::write_sample_list;
use crate::selection::select_pending;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

pub fn run(args: &RunArgs) -> Result<()> {
    execute(&args.inputs, &args.execution, args.dry_run)
}

pub fn dry_run(args: &DryRunArgs) -> Result<()> {
    execute(&args.inputs, &args.execution, true)
}

fn load(inputs: &InputArgs) -> Result<Inputs> {
    load_inputs(&inputs.sample_sheet, &inputs.config)
}

/// Resolve runner settings; a missing runner is fatal unless nothing will run.
fn runner_settings(exec: &ExecutionArgs, inputs: &Inputs, dry_run: bool) -> Result<RunnerSettings> {
    let program = match find_tool(&exec.runner) {
        Some(path) => path.display().to_string(),
        None if dry_run => exec.runner.clone(),
        None => bail!("{} command is not found", exec.runner),
    };
    Ok(RunnerSettings {
        program,
        batch_system: exec.batch_system.clone(),
        retry_count: exec.retry_count,
        extra_env: runner_env(&inputs.config, in_virtualenv()),
        ..RunnerSettings::default()
    })
}

/// Copy an input document into the output root unless it already lives there.
fn copy_into_output_root(source: &Path, output_root: &Path) -> Result<()> {
    let name = source
        .file_name()
        .ok_or_else(|| anyhow!("{} has no file name", source.display()))?;
    let dest = output_root.join(name);
    if same_file_path(source, &dest) {
        tracing::debug!(path = %dest.display(), "input document already in output root");
        return Ok(());
    }
    fs::copy(source, &dest)
        .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
    Ok(())
}

/// File checks and output-root preparation that must succeed before selection.
fn prepare(ctx: &RunContext, exec: &ExecutionArgs) -> Result<()> {
    let config = ctx.config();
    if !check_sample_sheet_files(
        &ctx.inputs.sample_sheet,
        exec.file_exists_check,
        exec.file_hash_check,
    ) {
        bail!("some files in the sample sheet are missing");
    }
    if !check_reference_secondary_files(Path::new(&config.reference.path)) {
        bail!("some secondary files of the reference are missing");
    }
    if !workflow_file_exists(&config.workflow_file.path) {
        bail!("missing workflow file [{}]", config.workflow_file.path);
    }
    if !check_config_files(config) {
        bail!("some files for workflow execution are missing");
    }

    let job_manager = ctx.layout.job_manager_dir();
    fs::create_dir_all(&job_manager)
        .with_context(|| format!("create output directory {}", job_manager.display()))?;
    copy_into_output_root(&ctx.inputs.sample_sheet_path, ctx.layout.root())?;
    copy_into_output_root(&ctx.inputs.config_path, ctx.layout.root())?;
    Ok(())
}

fn execute(input_args: &InputArgs, exec: &ExecutionArgs, dry_run: bool) -> Result<()> {
    let inputs = load(input_args)?;
    let settings = runner_settings(exec, &inputs, dry_run)?;
    let ctx = RunContext::new(inputs, settings);
    prepare(&ctx, exec)?;

    let pending_ids = select_pending(ctx.layout.root(), ctx.samples());
    for (index, sample) in ctx.samples().iter().enumerate() {
        if pending_ids.contains(&sample.sample_id) {
            println!("index: {index}, SampleId: {} will be executed", sample.sample_id);
        }
    }
    if dry_run {
        println!(
            "[{}/{}] task will be executed.",
            pending_ids.len(),
            ctx.samples().len()
        );
        return Ok(());
    }

    let timestamp = invocation_timestamp(chrono::Local::now());
    let pending = ctx.samples_by_id(&pending_ids);
    tracing::info!(
        timestamp = %timestamp,
        pending = pending.len(),
        max_parallel = ?exec.max_parallel,
        "dispatching batch"
    );
    let batch = dispatch_all(&ctx, &pending, &timestamp, exec.max_parallel);
    println!(
        "[{}/{}] task finished successfully.",
        batch.succeeded(),
        pending.len()
    );
    if let Some(err) = batch.first_error {
        return Err(err.context("dispatch batch"));
    }
    println!("fin");
    Ok(())
}

pub fn show_job_progress(args: &ShowJobProgressArgs) -> Result<()> {
    let inputs = load(&args.inputs)?;
    let ctx = RunContext::new(inputs, RunnerSettings::default());
    report(
        &ctx,
        ProgressFilter::from_flags(args.only_new, args.only_finished),
    );
    Ok(())
}

pub fn pull_images(args: &PullContainerImagesArgs) -> Result<()> {
    let inputs = load(&args.inputs)?;
    let ctx = RunContext::new(inputs, RunnerSettings::default());
    if !check_config_files(ctx.config()) {
        bail!("some files for workflow execution are missing");
    }
    let runtime = if args.docker {
        ContainerRuntime::Docker
    } else {
        ContainerRuntime::Singularity
    };
    pull_container_images(&ctx, runtime)
}

pub fn display_jobmanager_recognition(args: &RecognitionArgs) -> Result<()> {
    let inputs = load(&args.inputs)?;
    display_recognition(&inputs.config, &args.runner);
    println!("Sample sheet files:");
    if check_sample_sheet_files(&inputs.sample_sheet, true, true) {
        println!("  all present");
    }
    Ok(())
}

pub fn generate_sample_list(args: &GenerateSampleListArgs) -> Result<()> {
    let inputs = load(&args.inputs)?;
    let ctx = RunContext::new(inputs, RunnerSettings::default());
    let path = write_sample_list(&ctx)?;
    println!("Sample ID List: {}", path.display());
    Ok(())
}
