//! Manifest-ordered sample id list for downstream tooling.
use crate::context::RunContext;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Render the sample ids of the sheet as a YAML sequence.
pub fn render_sample_list(sample_ids: &[String]) -> Result<String> {
    serde_yaml::to_string(sample_ids).context("serialize sample list")
}

/// Write `<output_root>/sample_list.yaml` and return its path.
pub fn write_sample_list(ctx: &RunContext) -> Result<PathBuf> {
    let root = ctx.layout.root();
    fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    let path = ctx.layout.sample_list_path();
    let text = render_sample_list(&ctx.inputs.sample_sheet.sample_ids())?;
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
