//! Human-readable progress of a sample sheet against its output root.
//!
//! Completion is recomputed from the filesystem at report time. Pending
//! samples are explained from the newest `jobManager/<timestamp>/<sample>/`
//! leaf that exists for them.
use crate::context::RunContext;
use crate::layout::{JobDir, OutputLayout};
use crate::selection::{partition, Selection};
use std::fs;
use std::path::Path;

/// Which sections of the report to print. The summary is always printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressFilter {
    pub show_finished: bool,
    pub show_pending: bool,
}

impl Default for ProgressFilter {
    fn default() -> Self {
        Self {
            show_finished: true,
            show_pending: true,
        }
    }
}

impl ProgressFilter {
    pub fn from_flags(only_new: bool, only_finished: bool) -> Self {
        Self {
            show_finished: !only_new,
            show_pending: !only_finished,
        }
    }
}

/// State of the most recent recorded attempt for a pending sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// No exit code was written: the runner is still going or was interrupted.
    ExitCodeMissing,
    Failed { exit_code: String },
    /// Exit code zero, yet the sample is still incomplete.
    ZeroWithoutResults,
}

#[derive(Debug, Clone)]
pub struct LastAttempt {
    pub timestamp: String,
    pub job: JobDir,
    pub state: AttemptState,
}

/// Invocation timestamps under `jobManager/`, newest first.
pub fn invocation_timestamps(layout: &OutputLayout) -> Vec<String> {
    let dir = layout.job_manager_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(path = %dir.display(), "no job history: {err}");
            return Vec::new();
        }
    };
    let mut timestamps = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect::<Vec<_>>();
    timestamps.sort();
    timestamps.reverse();
    timestamps
}

fn read_exit_code(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    Some(text.lines().next().unwrap_or_default().trim().to_string())
}

/// Find and classify the newest attempt recorded for `sample_id`.
pub fn last_attempt(
    layout: &OutputLayout,
    timestamps: &[String],
    sample_id: &str,
) -> Option<LastAttempt> {
    let timestamp = timestamps
        .iter()
        .find(|timestamp| layout.job_dir(timestamp, sample_id).root().is_dir())?;
    let job = layout.job_dir(timestamp, sample_id);
    let state = match read_exit_code(&job.exit_code_path()) {
        None => AttemptState::ExitCodeMissing,
        Some(code) if code == "0" => AttemptState::ZeroWithoutResults,
        Some(code) => AttemptState::Failed { exit_code: code },
    };
    Some(LastAttempt {
        timestamp: timestamp.clone(),
        job,
        state,
    })
}

fn print_capture(label: &str, path: &Path) {
    if path.is_file() {
        println!(" {label}: [{}]", path.display());
    } else {
        println!(" {label} file is missing. expected path is [{}]", path.display());
    }
}

fn print_attempt(sample_id: &str, attempt: &LastAttempt) {
    if attempt.state == AttemptState::ZeroWithoutResults {
        tracing::warn!(sample = sample_id, timestamp = %attempt.timestamp, "exit code 0 without results");
        println!(
            "Error: Something wrong SampleId[{sample_id}] is exitcode 0. but not created result directory under output_path"
        );
    }
    println!("Sample ID: [{sample_id}] has error");
    match &attempt.state {
        AttemptState::ExitCodeMissing => {
            println!(" ExitCode file is missing. The runner may still be running or was interrupted")
        }
        AttemptState::Failed { exit_code } => println!(" ExitCode: [{exit_code}]"),
        AttemptState::ZeroWithoutResults => println!(" ExitCode: [0]"),
    }
    print_capture("Stdout", &attempt.job.stdout_path());
    print_capture("Stderr", &attempt.job.stderr_path());
}

/// Print per-sample progress and the two-line summary, returning the selection.
pub fn report(ctx: &RunContext, filter: ProgressFilter) -> Selection {
    let selection = partition(ctx.layout.root(), ctx.samples());
    if filter.show_finished {
        for sample_id in &selection.finished {
            println!("{sample_id} is finished.");
        }
    }

    let timestamps = invocation_timestamps(&ctx.layout);
    for sample_id in &selection.pending {
        if let Some(attempt) = last_attempt(&ctx.layout, &timestamps, sample_id) {
            print_attempt(sample_id, &attempt);
        }
    }
    if filter.show_pending {
        for sample_id in &selection.pending {
            println!("{sample_id} will be executed");
        }
    }

    println!("{}/{} finished", selection.finished.len(), selection.total());
    println!("{} will be executed", selection.pending.len());
    selection
}
