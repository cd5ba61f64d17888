//! Shared test infrastructure for integration tests.
//!
//! A [`Workspace`] is a temp directory holding a reference bundle, FASTQ
//! inputs, both input documents and an output root, so the compiled binary
//! can be driven end to end with a fake workflow runner.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Per-sample result artifacts the job manager expects under `<out>/<sample>/`.
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

pub const RUN_RESULT_SUFFIXES: &[&str] = &[".bam", ".bam.log"];

const REFERENCE_FILES: &[&str] = &[
    "ref/genome.fa",
    "ref/genome.fa.amb",
    "ref/genome.fa.ann",
    "ref/genome.fa.bwt",
    "ref/genome.fa.pac",
    "ref/genome.fa.sa",
    "ref/genome.fa.alt",
    "ref/genome.fa.fai",
    "ref/genome.dict",
    "ref/dbsnp.vcf.gz",
    "ref/mills.vcf.gz",
    "ref/known_indels.vcf.gz",
    "ref/autosome_PAR.bed",
    "ref/autosome_PAR.interval_list",
    "ref/chrX_nonPAR.bed",
    "ref/chrX_nonPAR.interval_list",
    "ref/chrY_nonPAR.bed",
    "ref/chrY_nonPAR.interval_list",
    "per-sample/Workflows/per-sample.cwl",
];

/// Shell snippet that fakes a successful workflow run: it writes every
/// artifact for the sample named by `--outdir` and for each `run_id` in the
/// job file passed as the last argument.
pub fn producing_runner_body() -> String {
    let sample_suffixes = SAMPLE_RESULT_SUFFIXES.join(" ");
    let run_suffixes = RUN_RESULT_SUFFIXES.join(" ");
    format!(
        r#"outdir=""
prev=""
for arg; do
  if [ "$prev" = "--outdir" ]; then outdir="$arg"; fi
  prev="$arg"
  last="$arg"
done
sample=$(basename "$outdir")
mkdir -p "$outdir"
for suffix in {sample_suffixes}; do printf data > "$outdir/$sample$suffix"; done
for run in $(sed -n 's/^[- ]*run_id: *//p' "$last"); do
  for suffix in {run_suffixes}; do printf data > "$outdir/$run$suffix"; done
done
echo "finished $sample"
exit 0"#
    )
}

pub struct Workspace {
    pub dir: TempDir,
    samples: Vec<(String, Vec<String>)>,
}

impl Workspace {
    /// Lay out inputs for `samples`, each given as `(sample_id, run_ids)`.
    pub fn new(samples: &[(&str, &[&str])]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for rel in REFERENCE_FILES {
            write_file(&dir.path().join(rel), b"ref");
        }
        let workspace = Self {
            dir,
            samples: samples
                .iter()
                .map(|(id, runs)| {
                    (
                        id.to_string(),
                        runs.iter().map(|run| run.to_string()).collect(),
                    )
                })
                .collect(),
        };
        for (_, runs) in &workspace.samples {
            for run in runs {
                write_file(&workspace.fastq(run, 1), b"@r\nACGT\n+\nIIII\n");
                write_file(&workspace.fastq(run, 2), b"@r\nTGCA\n+\nIIII\n");
            }
        }
        workspace.write_sample_sheet();
        workspace.write_config(|_| {});
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn fastq(&self, run_id: &str, mate: u8) -> PathBuf {
        self.root().join("fastq").join(format!("{run_id}_{mate}.fq.gz"))
    }

    pub fn sample_sheet_path(&self) -> PathBuf {
        self.root().join("samplesheet.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("configfile.json")
    }

    pub fn output_root(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn job_manager_dir(&self) -> PathBuf {
        self.output_root().join("jobManager")
    }

    /// Invocation directories under `jobManager/`, oldest first.
    pub fn invocations(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.job_manager_dir()) else {
            return Vec::new();
        };
        let mut dirs = entries
            .map(|entry| entry.expect("dir entry").path())
            .filter(|path| path.is_dir())
            .collect::<Vec<_>>();
        dirs.sort();
        dirs
    }

    fn write_sample_sheet(&self) {
        let samplelist = self
            .samples
            .iter()
            .map(|(id, runs)| {
                let runlist = runs
                    .iter()
                    .map(|run| {
                        json!({
                            "runid": run,
                            "data": {
                                "se_or_pe": "PE",
                                "fq1": self.fastq(run, 1).display().to_string(),
                                "fq1_MD5": "",
                                "fq2": self.fastq(run, 2).display().to_string(),
                                "fq2_MD5": ""
                            }
                        })
                    })
                    .collect::<Vec<_>>();
                json!({ "sampleid": id, "platform": "ILLUMINA", "runlist": runlist })
            })
            .collect::<Vec<_>>();
        write_json(
            &self.sample_sheet_path(),
            &json!({ "name": "cohort", "samplelist": samplelist }),
        );
    }

    /// Write the config document after letting `edit` adjust it.
    pub fn write_config(&self, edit: impl FnOnce(&mut Value)) {
        let path = |rel: &str| self.root().join(rel).display().to_string();
        let mut config = json!({
            "workflow_file": { "path": path("per-sample/Workflows/per-sample.cwl") },
            "output_directory": { "path": path("out") },
            "reference": { "path": path("ref/genome.fa"), "format": "http://edamontology.org/format_1929" },
            "sortsam_max_records_in_ram": 5000000,
            "sortsam_java_options": "-XX:-UseContainerSupport -Xmx30g",
            "bwa_num_threads": 16,
            "bwa_bases_per_batch": 10000000,
            "use_bqsr": true,
            "dbsnp": { "path": path("ref/dbsnp.vcf.gz") },
            "mills": { "path": path("ref/mills.vcf.gz") },
            "known_indels": { "path": path("ref/known_indels.vcf.gz") },
            "samtools_num_threads": 16,
            "gatk4_HaplotypeCaller_num_threads": 4,
            "bgzip_num_threads": 8,
            "haplotypecaller_autosome_PAR_interval_bed": { "path": path("ref/autosome_PAR.bed") },
            "haplotypecaller_autosome_PAR_interval_list": { "path": path("ref/autosome_PAR.interval_list") },
            "haplotypecaller_chrX_nonPAR_interval_bed": { "path": path("ref/chrX_nonPAR.bed") },
            "haplotypecaller_chrX_nonPAR_interval_list": { "path": path("ref/chrX_nonPAR.interval_list") },
            "haplotypecaller_chrY_nonPAR_interval_bed": { "path": path("ref/chrY_nonPAR.bed") },
            "haplotypecaller_chrY_nonPAR_interval_list": { "path": path("ref/chrY_nonPAR.interval_list") }
        });
        edit(&mut config);
        write_json(&self.config_path(), &config);
    }

    /// Write every expected artifact for `sample_id` into the output root.
    pub fn complete_sample(&self, sample_id: &str) {
        let sample_dir = self.output_root().join(sample_id);
        for suffix in SAMPLE_RESULT_SUFFIXES {
            write_file(&sample_dir.join(format!("{sample_id}{suffix}")), b"data");
        }
        let runs = self
            .samples
            .iter()
            .find(|(id, _)| id == sample_id)
            .map(|(_, runs)| runs.clone())
            .unwrap_or_default();
        for run in runs {
            for suffix in RUN_RESULT_SUFFIXES {
                write_file(&sample_dir.join(format!("{run}{suffix}")), b"data");
            }
        }
    }

    /// Write an executable `/bin/sh` script into the workspace.
    #[cfg(unix)]
    pub fn write_runner(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = self.root().join("bin").join(name);
        write_file(&path, format!("#!/bin/sh\n{body}\n").as_bytes());
        let mut perms = fs::metadata(&path).expect("stat runner").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod runner");
        path
    }

    /// Run `jobmanager <command> [flags...] <sheet> <config>`.
    pub fn jobmanager(&self, command: &str, flags: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_jobmanager"))
            .arg(command)
            .args(flags)
            .arg(self.sample_sheet_path())
            .arg(self.config_path())
            .current_dir(self.root())
            .env_remove("VIRTUAL_ENV")
            .env_remove("CONDA_DEFAULT_ENV")
            .output()
            .expect("run jobmanager")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

fn write_json(path: &Path, value: &Value) {
    write_file(
        path,
        &serde_json::to_vec_pretty(value).expect("serialize json"),
    );
}
