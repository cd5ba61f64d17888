//! Result completeness checks over the output root.
//!
//! A sample counts as finished only when every artifact in a fixed catalog
//! exists under `<root>/<sample>/`. Nothing else records completion, so these
//! checks re-stat the filesystem on every call.
use crate::checks::append_suffix;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Log files may legitimately be empty; every other artifact must not be.
pub const LOG_SUFFIX: &str = ".log";

/// Artifacts written once per run as `<sample_dir>/<run_id><suffix>`.
pub const RUN_RESULT_SUFFIXES: &[&str] = &[".bam", ".bam.log"];

/// Artifacts written once per sample as `<sample_dir>/<sample_id><suffix>`.
///
/// This list mirrors the per-sample workflow outputs; it must be updated
/// whenever the workflow's output set changes.
pub const SAMPLE_RESULT_SUFFIXES: &[&str] = &[
    ".autosome_PAR_ploidy_2.g.vcf.gz",
    ".autosome_PAR_ploidy_2.g.vcf.gz.bcftools-stats",
    ".autosome_PAR_ploidy_2.g.vcf.gz.bcftools-stats.log",
    ".autosome_PAR_ploidy_2.g.vcf.gz.log",
    ".autosome_PAR_ploidy_2.g.vcf.gz.tbi",
    ".autosome_PAR_ploidy_2.g.vcf.gz.tbi.log",
    ".autosome_PAR_ploidy_2.g.vcf.log",
    ".bam.log",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz.bcftools-stats",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz.bcftools-stats.log",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz.log",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz.tbi",
    ".chrX_nonPAR_ploidy_1.g.vcf.gz.tbi.log",
    ".chrX_nonPAR_ploidy_1.g.vcf.log",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz.bcftools-stats",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz.bcftools-stats.log",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz.log",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz.tbi",
    ".chrX_nonPAR_ploidy_2.g.vcf.gz.tbi.log",
    ".chrX_nonPAR_ploidy_2.g.vcf.log",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz.bcftools-stats",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz.bcftools-stats.log",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz.log",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz.tbi",
    ".chrY_nonPAR_ploidy_1.g.vcf.gz.tbi.log",
    ".chrY_nonPAR_ploidy_1.g.vcf.log",
    ".cram",
    ".cram.autosome_PAR_ploidy_2.wgs_metrics",
    ".cram.autosome_PAR_ploidy_2.wgs_metrics.log",
    ".cram.chrX_nonPAR_ploidy_1.wgs_metrics",
    ".cram.chrX_nonPAR_ploidy_1.wgs_metrics.log",
    ".cram.chrX_nonPAR_ploidy_2.wgs_metrics",
    ".cram.chrX_nonPAR_ploidy_2.wgs_metrics.log",
    ".cram.chrY_nonPAR_ploidy_1.wgs_metrics",
    ".cram.chrY_nonPAR_ploidy_1.wgs_metrics.log",
    ".cram.collect_base_dist_by_cycle",
    ".cram.collect_base_dist_by_cycle.chart.pdf",
    ".cram.collect_base_dist_by_cycle.chart.png",
    ".cram.crai",
    ".cram.crai.log",
    ".cram.flagstat",
    ".cram.idxstats",
    ".cram.log",
    ".log",
    ".metrics.txt",
];

/// Why an expected artifact does not count as present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactIssue {
    MissingDirectory(PathBuf),
    Missing(PathBuf),
    Empty(PathBuf),
}

impl fmt::Display for ArtifactIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactIssue::MissingDirectory(path) => {
                write!(f, "Missing result directory [{}]", path.display())
            }
            ArtifactIssue::Missing(path) => write!(f, "Missing file [{}]", path.display()),
            ArtifactIssue::Empty(path) => write!(f, "File size is zero [{}]", path.display()),
        }
    }
}

/// Collect issues with the per-sample catalog under `<output_root>/<sample_id>/`.
pub fn sample_artifact_issues(output_root: &Path, sample_id: &str) -> Vec<ArtifactIssue> {
    let sample_dir = output_root.join(sample_id);
    if !sample_dir.is_dir() {
        return vec![ArtifactIssue::MissingDirectory(sample_dir)];
    }
    let prefix = sample_dir.join(sample_id);
    SAMPLE_RESULT_SUFFIXES
        .iter()
        .filter_map(|suffix| {
            let path = append_suffix(&prefix, suffix);
            let size_checked = !suffix.ends_with(LOG_SUFFIX);
            probe_artifact(path, size_checked)
        })
        .collect()
}

/// Collect issues with the per-run catalog under `sample_dir`.
///
/// Run artifacts are only checked for existence.
pub fn run_artifact_issues(sample_dir: &Path, run_id: &str) -> Vec<ArtifactIssue> {
    let prefix = sample_dir.join(run_id);
    RUN_RESULT_SUFFIXES
        .iter()
        .filter_map(|suffix| probe_artifact(append_suffix(&prefix, suffix), false))
        .collect()
}

/// Report whether every per-sample artifact exists, printing each issue.
pub fn is_sample_complete(output_root: &Path, sample_id: &str) -> bool {
    report_issues(&sample_artifact_issues(output_root, sample_id))
}

/// Report whether every per-run artifact exists, printing each issue.
pub fn is_run_complete(sample_dir: &Path, run_id: &str) -> bool {
    report_issues(&run_artifact_issues(sample_dir, run_id))
}

fn report_issues(issues: &[ArtifactIssue]) -> bool {
    for issue in issues {
        println!("{issue}");
    }
    issues.is_empty()
}

fn probe_artifact(path: PathBuf, size_checked: bool) -> Option<ArtifactIssue> {
    match fs::metadata(&path) {
        Err(_) => Some(ArtifactIssue::Missing(path)),
        Ok(meta) if size_checked && meta.len() == 0 => Some(ArtifactIssue::Empty(path)),
        Ok(_) => None,
    }
}


#[cfg(test)]
#[path = "completeness_tests.rs"]
mod tests;
