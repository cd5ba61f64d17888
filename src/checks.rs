//! File-level checks run before any sample is dispatched.
//!
//! Every check prints one line per offending file and returns a boolean so
//! callers can report all problems in one pass before giving up.
use crate::config::ReferenceConfig;
use crate::manifest::SampleSheet;
use anyhow::{Context, Result};
use md5::{Digest, Md5};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Index and dictionary files bwa/samtools/GATK expect beside the reference.
pub const REFERENCE_SECONDARY_SUFFIXES: [&str; 7] =
    [".amb", ".ann", ".bwt", ".pac", ".sa", ".alt", ".fai"];

fn valid_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9/._-]*$").expect("valid path regex"))
}

/// True when `path` only uses characters safe to hand to the runner verbatim.
pub fn is_valid_path_chars(path: &str) -> bool {
    valid_path_regex().is_match(path)
}

/// True when `name` can be used as a single path segment.
pub fn is_valid_path_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && is_valid_path_chars(name)
}

/// Lower-hex MD5 digest of a file's contents.
pub fn md5_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a single run source file for existence and, optionally, its digest.
pub fn check_run_file(path: &str, expected_md5: &str, exists_check: bool, hash_check: bool) -> bool {
    if !exists_check {
        return true;
    }
    let path = Path::new(path);
    if !path.is_file() {
        return false;
    }
    if !hash_check || expected_md5.is_empty() {
        return true;
    }
    match md5_file(path) {
        Ok(actual) if actual.eq_ignore_ascii_case(expected_md5) => true,
        Ok(actual) => {
            println!("expected: [{expected_md5}]");
            println!("actual  : [{actual}]");
            println!("md5 is not match [{}]", path.display());
            false
        }
        Err(err) => {
            println!("cannot hash [{}]: {err:#}", path.display());
            false
        }
    }
}

/// Check every source file named by the sample sheet.
pub fn check_sample_sheet_files(sheet: &SampleSheet, exists_check: bool, hash_check: bool) -> bool {
    let mut ok = true;
    for sample in &sheet.samples {
        for run in &sample.runs {
            for (path, md5) in run.data.source_files() {
                if !check_run_file(path, md5, exists_check, hash_check) {
                    println!(
                        "SampleID[{}] RunID[{}] file [{}] is missing or hash value error",
                        sample.sample_id, run.run_id, path
                    );
                    ok = false;
                }
            }
        }
    }
    ok
}

/// File name without its last extension (`genome.fa` -> `genome`).
pub fn file_stem_without_extension(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Expected secondary files for a reference FASTA.
pub fn reference_secondary_files(reference: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = REFERENCE_SECONDARY_SUFFIXES
        .iter()
        .map(|suffix| append_suffix(reference, suffix))
        .collect();
    let dict = format!("{}.dict", file_stem_without_extension(reference));
    files.push(match reference.parent() {
        Some(parent) => parent.join(dict),
        None => PathBuf::from(dict),
    });
    files
}

pub fn check_reference_secondary_files(reference: &Path) -> bool {
    let mut ok = true;
    for file in reference_secondary_files(reference) {
        if !file.exists() {
            println!("Missing file [{}]", file.display());
            ok = false;
        }
    }
    ok
}

/// Remote workflow locations are accepted without probing.
pub fn workflow_file_exists(path: &str) -> bool {
    if path.starts_with("http://") || path.starts_with("https://") {
        return true;
    }
    Path::new(path).is_file()
}

/// Check that the workflow and every local input named by the config exist.
pub fn check_config_files(config: &ReferenceConfig) -> bool {
    let mut ok = true;
    if !workflow_file_exists(&config.workflow_file.path) {
        println!("Missing workflow file [{}]", config.workflow_file.path);
        ok = false;
    }
    for (key, path) in config.input_files() {
        if !Path::new(path).exists() {
            println!("In config file, `{key}` [{path}] is missing");
            ok = false;
        }
    }
    ok
}

/// Compare two paths after resolving symlinks.
pub fn same_file_path(a: &Path, b: &Path) -> bool {
    resolve_path(a) == resolve_path(b)
}

fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
