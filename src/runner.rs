//! Per-sample execution of the external workflow runner.
//!
//! Each dispatch writes only inside its own `jobManager/<timestamp>/<sample>/`
//! leaf, so concurrent dispatches never touch each other's files.
use crate::context::RunContext;
use crate::environment::DEFAULT_RUNNER;
use crate::job_file::write_job_file;
use crate::layout::JobDir;
use crate::manifest::Sample;
use crate::selection::needs_execution;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Fixed resource and backend flags passed to every runner invocation.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub program: String,
    pub max_disk: String,
    pub max_memory: String,
    pub default_memory: String,
    pub default_disk: String,
    pub batch_system: String,
    pub retry_count: u32,
    pub container_flag: Option<String>,
    pub extra_env: Vec<(String, String)>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_RUNNER.to_string(),
            max_disk: "248G".to_string(),
            max_memory: "64G".to_string(),
            default_memory: "32000".to_string(),
            default_disk: "32000".to_string(),
            batch_system: "slurm".to_string(),
            retry_count: 1,
            container_flag: Some("--singularity".to_string()),
            extra_env: Vec::new(),
        }
    }
}

/// Build the runner argument list for one sample.
pub fn runner_arguments(
    settings: &RunnerSettings,
    job: &JobDir,
    sample_outdir: &Path,
    workflow_file: &str,
) -> Vec<String> {
    let mut args = vec![
        "--maxDisk".to_string(),
        settings.max_disk.clone(),
        "--maxMemory".to_string(),
        settings.max_memory.clone(),
        "--defaultMemory".to_string(),
        settings.default_memory.clone(),
        "--defaultDisk".to_string(),
        settings.default_disk.clone(),
        "--disableCaching".to_string(),
        "--jobStore".to_string(),
        job.job_store_path().display().to_string(),
        "--outdir".to_string(),
        sample_outdir.display().to_string(),
        "--stats".to_string(),
        "--batchSystem".to_string(),
        settings.batch_system.clone(),
        "--retryCount".to_string(),
        settings.retry_count.to_string(),
    ];
    if let Some(flag) = &settings.container_flag {
        args.push(flag.clone());
    }
    args.push("--logFile".to_string());
    args.push(job.runner_log_path().display().to_string());
    args.push(workflow_file.to_string());
    args.push(job.job_file().display().to_string());
    args
}

/// Result of one sample's runner execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    /// The runner exited non-zero (or was killed: `exit_code` is -1).
    Failed {
        exit_code: i32,
        stdout: PathBuf,
        stderr: PathBuf,
    },
    /// The runner exited zero but result artifacts are missing.
    Incomplete { stdout: PathBuf, stderr: PathBuf },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded)
    }

    /// Print the operator-facing verdict for `sample_id`.
    pub fn report(&self, sample_id: &str) {
        match self {
            DispatchOutcome::Succeeded => {
                println!("SampleId: {sample_id} is successfully finished");
            }
            DispatchOutcome::Failed {
                exit_code,
                stdout,
                stderr,
            } => {
                println!("SampleId: {sample_id} is fail. exitcode = {exit_code}");
                print_capture_paths(stdout, stderr);
            }
            DispatchOutcome::Incomplete { stdout, stderr } => {
                println!("SampleId: {sample_id} is fail. exitcode = 0 but result files are missing");
                print_capture_paths(stdout, stderr);
            }
        }
    }
}

fn print_capture_paths(stdout: &Path, stderr: &Path) {
    println!("  See stdout: {}", absolute(stdout).display());
    println!("  See stderr: {}", absolute(stderr).display());
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Prepare the job directory, run the runner to completion and judge the result.
///
/// `Err` is reserved for failures to prepare or launch; a runner that exits
/// badly or leaves artifacts missing yields a failed [`DispatchOutcome`].
pub fn dispatch(ctx: &RunContext, sample: &Sample, timestamp: &str) -> Result<DispatchOutcome> {
    let job = ctx.layout.job_dir(timestamp, &sample.sample_id);
    fs::create_dir_all(job.logs_dir())
        .with_context(|| format!("create {}", job.logs_dir().display()))?;
    write_job_file(&job.job_file(), ctx.config(), sample)?;

    let sample_outdir = ctx.layout.sample_dir(&sample.sample_id);
    let args = runner_arguments(
        &ctx.runner,
        &job,
        &sample_outdir,
        &ctx.config().workflow_file.path,
    );
    let stdout_path = job.stdout_path();
    let stderr_path = job.stderr_path();
    let stdout = fs::File::create(&stdout_path)
        .with_context(|| format!("create {}", stdout_path.display()))?;
    let stderr = fs::File::create(&stderr_path)
        .with_context(|| format!("create {}", stderr_path.display()))?;

    let mut command_line = vec![ctx.runner.program.clone()];
    command_line.extend(args.iter().cloned());
    tracing::info!(
        sample = %sample.sample_id,
        command = %shell_words::join(&command_line),
        "starting workflow runner"
    );

    let mut cmd = Command::new(&ctx.runner.program);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));
    for (key, value) in &ctx.runner.extra_env {
        cmd.env(key, value);
    }
    let status = cmd
        .status()
        .with_context(|| format!("spawn {} for {}", ctx.runner.program, sample.sample_id))?;

    let exit_code = status.code().unwrap_or(-1);
    fs::write(job.exit_code_path(), format!("{exit_code}\n"))
        .with_context(|| format!("write {}", job.exit_code_path().display()))?;
    tracing::info!(sample = %sample.sample_id, exit_code, "workflow runner exited");

    let outcome = if exit_code != 0 {
        DispatchOutcome::Failed {
            exit_code,
            stdout: stdout_path,
            stderr: stderr_path,
        }
    } else if needs_execution(ctx.layout.root(), sample) {
        DispatchOutcome::Incomplete {
            stdout: stdout_path,
            stderr: stderr_path,
        }
    } else {
        DispatchOutcome::Succeeded
    };
    outcome.report(&sample.sample_id);
    Ok(outcome)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
