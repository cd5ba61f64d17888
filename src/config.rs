//! Reference configuration document.
//!
//! Holds the workflow location, the output root and every reference
//! parameter forwarded to the job file.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file reference with an optional EDAM format.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathObject {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A bare file or directory reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathOnlyObject {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReferenceConfig {
    pub workflow_file: PathOnlyObject,
    pub output_directory: PathOnlyObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_cache_directory: Option<PathOnlyObject>,
    pub reference: PathObject,
    pub sortsam_max_records_in_ram: i64,
    pub sortsam_java_options: String,
    pub bwa_num_threads: i64,
    pub bwa_bases_per_batch: i64,
    pub use_bqsr: bool,
    pub dbsnp: PathObject,
    pub mills: PathObject,
    pub known_indels: PathObject,
    pub samtools_num_threads: i64,
    #[serde(rename = "gatk4_HaplotypeCaller_num_threads")]
    pub gatk4_haplotype_caller_num_threads: i64,
    pub bgzip_num_threads: i64,
    #[serde(rename = "haplotypecaller_autosome_PAR_interval_bed")]
    pub autosome_par_interval_bed: PathObject,
    #[serde(rename = "haplotypecaller_autosome_PAR_interval_list")]
    pub autosome_par_interval_list: PathOnlyObject,
    #[serde(rename = "haplotypecaller_chrX_nonPAR_interval_bed")]
    pub chrx_nonpar_interval_bed: PathObject,
    #[serde(rename = "haplotypecaller_chrX_nonPAR_interval_list")]
    pub chrx_nonpar_interval_list: PathOnlyObject,
    #[serde(rename = "haplotypecaller_chrY_nonPAR_interval_bed")]
    pub chry_nonpar_interval_bed: PathObject,
    #[serde(rename = "haplotypecaller_chrY_nonPAR_interval_list")]
    pub chry_nonpar_interval_list: PathOnlyObject,
}

impl ReferenceConfig {
    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.output_directory.path)
    }

    pub fn container_cache_dir(&self) -> Option<&str> {
        self.container_cache_directory
            .as_ref()
            .map(|dir| dir.path.as_str())
            .filter(|path| !path.is_empty())
    }

    /// Every path named by the config, keyed by its document field.
    pub fn named_paths(&self) -> Vec<(&'static str, &str)> {
        let mut paths = vec![
            ("workflow_file", self.workflow_file.path.as_str()),
            ("output_directory", self.output_directory.path.as_str()),
        ];
        if let Some(cache) = self.container_cache_dir() {
            paths.push(("container_cache_directory", cache));
        }
        paths.extend(self.input_files());
        paths
    }

    /// Local input files the workflow reads, excluding the workflow itself.
    pub fn input_files(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("reference", self.reference.path.as_str()),
            ("dbsnp", self.dbsnp.path.as_str()),
            ("mills", self.mills.path.as_str()),
            ("known_indels", self.known_indels.path.as_str()),
            (
                "haplotypecaller_autosome_PAR_interval_bed",
                self.autosome_par_interval_bed.path.as_str(),
            ),
            (
                "haplotypecaller_autosome_PAR_interval_list",
                self.autosome_par_interval_list.path.as_str(),
            ),
            (
                "haplotypecaller_chrX_nonPAR_interval_bed",
                self.chrx_nonpar_interval_bed.path.as_str(),
            ),
            (
                "haplotypecaller_chrX_nonPAR_interval_list",
                self.chrx_nonpar_interval_list.path.as_str(),
            ),
            (
                "haplotypecaller_chrY_nonPAR_interval_bed",
                self.chry_nonpar_interval_bed.path.as_str(),
            ),
            (
                "haplotypecaller_chrY_nonPAR_interval_list",
                self.chry_nonpar_interval_list.path.as_str(),
            ),
        ]
    }
}
