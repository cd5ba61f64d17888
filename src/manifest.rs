//! Sample sheet types.
//!
//! The sample sheet is the manifest of samples to process. It is loaded once
//! per invocation and never mutated afterwards.
use serde::{Deserialize, Serialize};

/// Platform name written into job files when a sample leaves it empty.
pub const DEFAULT_PLATFORM: &str = "ILLUMINA";

/// Root document of a sample sheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleSheet {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "samplelist")]
    pub samples: Vec<Sample>,
}

impl SampleSheet {
    /// Sample identifiers in manifest order.
    pub fn sample_ids(&self) -> Vec<String> {
        self.samples
            .iter()
            .map(|sample| sample.sample_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Sample {
    #[serde(rename = "sampleid")]
    pub sample_id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(rename = "runlist")]
    pub runs: Vec<Run>,
}

impl Sample {
    /// Platform tag for job files, falling back to [`DEFAULT_PLATFORM`].
    pub fn platform_name(&self) -> &str {
        if self.platform.trim().is_empty() {
            DEFAULT_PLATFORM
        } else {
            &self.platform
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Run {
    #[serde(rename = "runid")]
    pub run_id: String,
    pub data: RunData,
}

/// Sequencing mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SequencingMode {
    #[serde(rename = "PE")]
    PairedEnd,
    #[serde(rename = "SE")]
    SingleEnd,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunData {
    #[serde(rename = "se_or_pe")]
    pub mode: SequencingMode,
    pub fq1: String,
    #[serde(rename = "fq1_MD5", default)]
    pub fq1_md5: String,
    #[serde(default)]
    pub fq2: String,
    #[serde(rename = "fq2_MD5", default)]
    pub fq2_md5: String,
}

impl RunData {
    /// Source files of the run paired with their expected digests.
    pub fn source_files(&self) -> Vec<(&str, &str)> {
        match self.mode {
            SequencingMode::PairedEnd => vec![
                (self.fq1.as_str(), self.fq1_md5.as_str()),
                (self.fq2.as_str(), self.fq2_md5.as_str()),
            ],
            SequencingMode::SingleEnd => vec![(self.fq1.as_str(), self.fq1_md5.as_str())],
        }
    }
}
