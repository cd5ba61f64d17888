//! Per-sample CWL job descriptor.
//!
//! Reference parameters come from the config; the run list is partitioned into
//! paired-end and single-end sublists as the workflow expects.
use crate::config::{PathObject, PathOnlyObject, ReferenceConfig};
use crate::manifest::{Sample, SequencingMode};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

const FORMAT_FASTA: &str = "http://edamontology.org/format_1929";
const FORMAT_FASTQ: &str = "http://edamontology.org/format_1930";
const FORMAT_VCF: &str = "http://edamontology.org/format_3016";
const FORMAT_BED: &str = "http://edamontology.org/format_3584";

/// A CWL `File` input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CwlFile {
    pub class: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl CwlFile {
    fn new(path: &str, format: Option<&str>) -> Self {
        Self {
            class: "File",
            path: path.to_string(),
            format: format.map(str::to_string),
        }
    }

    fn with_format(object: &PathObject, default_format: &str) -> Self {
        let format = object.format.as_deref().unwrap_or(default_format);
        Self::new(&object.path, Some(format))
    }

    fn bare(object: &PathOnlyObject) -> Self {
        Self::new(&object.path, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunEntry {
    pub run_id: String,
    pub platform_name: String,
    pub fastq1: CwlFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastq2: Option<CwlFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptor {
    pub reference: CwlFile,
    pub sortsam_max_records_in_ram: i64,
    pub sortsam_java_options: String,
    pub bwa_num_threads: i64,
    pub bwa_bases_per_batch: i64,
    pub use_bqsr: bool,
    pub dbsnp: CwlFile,
    pub mills: CwlFile,
    pub known_indels: CwlFile,
    pub samtools_num_threads: i64,
    #[serde(rename = "gatk4_HaplotypeCaller_num_threads")]
    pub gatk4_haplotype_caller_num_threads: i64,
    pub bgzip_num_threads: i64,
    #[serde(rename = "haplotypecaller_autosome_PAR_interval_bed")]
    pub autosome_par_interval_bed: CwlFile,
    #[serde(rename = "haplotypecaller_autosome_PAR_interval_list")]
    pub autosome_par_interval_list: CwlFile,
    #[serde(rename = "haplotypecaller_chrX_nonPAR_interval_bed")]
    pub chrx_nonpar_interval_bed: CwlFile,
    #[serde(rename = "haplotypecaller_chrX_nonPAR_interval_list")]
    pub chrx_nonpar_interval_list: CwlFile,
    #[serde(rename = "haplotypecaller_chrY_nonPAR_interval_bed")]
    pub chry_nonpar_interval_bed: CwlFile,
    #[serde(rename = "haplotypecaller_chrY_nonPAR_interval_list")]
    pub chry_nonpar_interval_list: CwlFile,
    pub sample_id: String,
    pub runlist_pe: Vec<RunEntry>,
    pub runlist_se: Vec<RunEntry>,
}

impl JobDescriptor {
    pub fn build(config: &ReferenceConfig, sample: &Sample) -> Self {
        let mut runlist_pe = Vec::new();
        let mut runlist_se = Vec::new();
        for run in &sample.runs {
            let fastq1 = CwlFile::new(&run.data.fq1, Some(FORMAT_FASTQ));
            let entry = RunEntry {
                run_id: run.run_id.clone(),
                platform_name: sample.platform_name().to_string(),
                fastq1,
                fastq2: None,
            };
            match run.data.mode {
                SequencingMode::PairedEnd => runlist_pe.push(RunEntry {
                    fastq2: Some(CwlFile::new(&run.data.fq2, Some(FORMAT_FASTQ))),
                    ..entry
                }),
                SequencingMode::SingleEnd => runlist_se.push(entry),
            }
        }

        Self {
            reference: CwlFile::with_format(&config.reference, FORMAT_FASTA),
            sortsam_max_records_in_ram: config.sortsam_max_records_in_ram,
            sortsam_java_options: config.sortsam_java_options.clone(),
            bwa_num_threads: config.bwa_num_threads,
            bwa_bases_per_batch: config.bwa_bases_per_batch,
            use_bqsr: config.use_bqsr,
            dbsnp: CwlFile::with_format(&config.dbsnp, FORMAT_VCF),
            mills: CwlFile::with_format(&config.mills, FORMAT_VCF),
            known_indels: CwlFile::with_format(&config.known_indels, FORMAT_VCF),
            samtools_num_threads: config.samtools_num_threads,
            gatk4_haplotype_caller_num_threads: config.gatk4_haplotype_caller_num_threads,
            bgzip_num_threads: config.bgzip_num_threads,
            autosome_par_interval_bed: CwlFile::with_format(
                &config.autosome_par_interval_bed,
                FORMAT_BED,
            ),
            autosome_par_interval_list: CwlFile::bare(&config.autosome_par_interval_list),
            chrx_nonpar_interval_bed: CwlFile::with_format(
                &config.chrx_nonpar_interval_bed,
                FORMAT_BED,
            ),
            chrx_nonpar_interval_list: CwlFile::bare(&config.chrx_nonpar_interval_list),
            chry_nonpar_interval_bed: CwlFile::with_format(
                &config.chry_nonpar_interval_bed,
                FORMAT_BED,
            ),
            chry_nonpar_interval_list: CwlFile::bare(&config.chry_nonpar_interval_list),
            sample_id: sample.sample_id.clone(),
            runlist_pe,
            runlist_se,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize job file")
    }
}

/// Render and write the job descriptor for `sample` to `path`.
pub fn write_job_file(path: &Path, config: &ReferenceConfig, sample: &Sample) -> Result<()> {
    let text = JobDescriptor::build(config, sample).to_yaml()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
