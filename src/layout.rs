//! Typed paths into the output root.
//!
//! The output root is the only persisted state: result artifacts live under
//! `<root>/<sample>/` and the audit trail under `<root>/jobManager/`.
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Directory under the output root holding one entry per invocation.
pub const JOB_MANAGER_DIR: &str = "jobManager";
/// Timestamp format for invocation directories; sorts lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub const JOB_FILE_NAME: &str = "job-file.yaml";
pub const STDOUT_FILE_NAME: &str = "toil.stdout.txt";
pub const STDERR_FILE_NAME: &str = "toil.stderr.txt";
pub const EXIT_CODE_FILE_NAME: &str = "toil.exitcode.txt";
pub const SAMPLE_LIST_FILE_NAME: &str = "sample_list.yaml";

/// Render an invocation timestamp shared by every sample of one batch.
pub fn invocation_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `<root>/<sample>/` result directory.
    pub fn sample_dir(&self, sample_id: &str) -> PathBuf {
        self.root.join(sample_id)
    }

    /// Return the `<root>/jobManager/` history directory.
    pub fn job_manager_dir(&self) -> PathBuf {
        self.root.join(JOB_MANAGER_DIR)
    }

    /// Return the `<root>/sample_list.yaml` path.
    pub fn sample_list_path(&self) -> PathBuf {
        self.root.join(SAMPLE_LIST_FILE_NAME)
    }

    pub fn invocation_dir(&self, timestamp: &str) -> PathBuf {
        self.job_manager_dir().join(timestamp)
    }

    pub fn job_dir(&self, timestamp: &str, sample_id: &str) -> JobDir {
        JobDir {
            root: self.invocation_dir(timestamp).join(sample_id),
        }
    }
}

/// Per-sample leaf of one invocation's history entry.
#[derive(Debug, Clone)]
pub struct JobDir {
    root: PathBuf,
}

impl JobDir {
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_file(&self) -> PathBuf {
        self.root.join(JOB_FILE_NAME)
    }

    pub fn stdout_path(&self) -> PathBuf {
        self.root.join(STDOUT_FILE_NAME)
    }

    pub fn stderr_path(&self) -> PathBuf {
        self.root.join(STDERR_FILE_NAME)
    }

    pub fn exit_code_path(&self) -> PathBuf {
        self.root.join(EXIT_CODE_FILE_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Runner log file inside `logs/`.
    pub fn runner_log_path(&self) -> PathBuf {
        self.logs_dir().join("toil.log")
    }

    /// Runner job store; must not exist before the runner starts.
    pub fn job_store_path(&self) -> PathBuf {
        self.root.join("jobstore")
    }
}
