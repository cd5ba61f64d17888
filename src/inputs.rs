//! Loading and validation of the sample sheet and reference config.
//!
//! Both documents are JSON validated against schemas embedded in the binary.
//! Problems are printed as they are found so one invocation reports all of
//! them, then loading fails as a whole.
use crate::checks::{is_valid_path_chars, is_valid_path_segment};
use crate::config::ReferenceConfig;
use crate::manifest::SampleSheet;
use crate::templates;
use anyhow::{anyhow, bail, Context, Result};
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Validated inputs of one invocation.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub sample_sheet_path: PathBuf,
    pub config_path: PathBuf,
    pub sample_sheet: SampleSheet,
    pub config: ReferenceConfig,
}

/// Validate `document` against a JSON Schema, returning every violation.
pub fn schema_errors(schema_text: &str, document: &Value) -> Result<Vec<String>> {
    let schema: Value = serde_json::from_str(schema_text).context("parse embedded schema")?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("compile embedded schema: {err}"))?;
    let messages = match compiled.validate(document) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect(),
    };
    Ok(messages)
}

fn load_document<T: DeserializeOwned>(path: &Path, label: &str, schema_text: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parse {label} JSON {}", path.display()))?;
    let errors = schema_errors(schema_text, &value)?;
    if !errors.is_empty() {
        println!("The {label} document is not valid. see errors :");
        for error in &errors {
            println!("- {error}");
        }
        bail!("{label} {} failed schema validation", path.display());
    }
    tracing::debug!(path = %path.display(), "{label} document is valid");
    serde_json::from_value(value).with_context(|| format!("decode {label} {}", path.display()))
}

/// Report sample/run identifiers that are duplicated or not path-safe.
pub fn identifier_problems(sheet: &SampleSheet) -> Vec<String> {
    let mut problems = Vec::new();
    let mut sample_ids = BTreeSet::new();
    for sample in &sheet.samples {
        if !is_valid_path_segment(&sample.sample_id) {
            problems.push(format!(
                "SampleID[{}] is not usable as a directory name",
                sample.sample_id
            ));
        }
        if !sample_ids.insert(sample.sample_id.as_str()) {
            problems.push(format!("SampleID[{}] is duplicated", sample.sample_id));
        }
        let mut run_ids = BTreeSet::new();
        for run in &sample.runs {
            if !is_valid_path_segment(&run.run_id) {
                problems.push(format!(
                    "In SampleID[{}] RunID[{}] is not usable as a file name",
                    sample.sample_id, run.run_id
                ));
            }
            if !run_ids.insert(run.run_id.as_str()) {
                problems.push(format!(
                    "In SampleID[{}] RunID[{}] is duplicated",
                    sample.sample_id, run.run_id
                ));
            }
        }
    }
    problems
}

/// Report run source paths with characters outside the safe set.
pub fn sample_sheet_path_problems(sheet: &SampleSheet) -> Vec<String> {
    let mut problems = Vec::new();
    for sample in &sheet.samples {
        for run in &sample.runs {
            for (path, _) in run.data.source_files() {
                if !is_valid_path_chars(path) {
                    problems.push(format!(
                        "In SampleID[{}] RunID[{}] [{}] has invalid character in filepath",
                        sample.sample_id, run.run_id, path
                    ));
                }
            }
        }
    }
    problems
}

/// Report config paths with characters outside the safe set.
pub fn config_path_problems(config: &ReferenceConfig) -> Vec<String> {
    config
        .named_paths()
        .into_iter()
        .filter(|(_, path)| !is_valid_path_chars(path))
        .map(|(key, path)| format!("In config file, `{key}` path [{path}] has invalid character."))
        .collect()
}

/// Load both documents, reporting every problem before failing.
pub fn load_inputs(sample_sheet_path: &Path, config_path: &Path) -> Result<Inputs> {
    let files = [
        (sample_sheet_path, "sample sheet"),
        (config_path, "config"),
    ];

    let mut names_ok = true;
    for (path, _) in files {
        if !is_valid_path_chars(&path.to_string_lossy()) {
            println!("[{}] has invalid character.", path.display());
            names_ok = false;
        }
    }
    if !names_ok {
        bail!("some required files have invalid characters in their names");
    }

    let mut all_exist = true;
    for (path, label) in files {
        if !path.is_file() {
            println!("[{}] is missing {label} file", path.display());
            all_exist = false;
        }
    }
    if !all_exist {
        bail!("some required files are missing");
    }

    let sample_sheet: Result<SampleSheet> = load_document(
        sample_sheet_path,
        "sample sheet",
        templates::SAMPLE_SHEET_SCHEMA_JSON,
    );
    let config: Result<ReferenceConfig> =
        load_document(config_path, "config", templates::CONFIG_FILE_SCHEMA_JSON);
    let (sample_sheet, config) = match (sample_sheet, config) {
        (Ok(sample_sheet), Ok(config)) => (sample_sheet, config),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => return Err(err),
        (Err(sheet_err), Err(config_err)) => {
            return Err(anyhow!("{sheet_err:#}; {config_err:#}"));
        }
    };

    let mut problems = identifier_problems(&sample_sheet);
    problems.extend(sample_sheet_path_problems(&sample_sheet));
    problems.extend(config_path_problems(&config));
    if !problems.is_empty() {
        for problem in &problems {
            println!("{problem}");
        }
        bail!("{} problem(s) found in input documents", problems.len());
    }

    Ok(Inputs {
        sample_sheet_path: sample_sheet_path.to_path_buf(),
        config_path: config_path.to_path_buf(),
        sample_sheet,
        config,
    })
}

#[cfg(test)]
#[path = "inputs_tests.rs"]
mod tests;
