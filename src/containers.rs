//! Pre-pull the container images a workflow references into the cache dir.
use crate::checks::workflow_file_exists;
use crate::context::RunContext;
use crate::environment::{find_tool, CWL_DOCKER_CACHE, CWL_SINGULARITY_CACHE};
use crate::templates;
use anyhow::{anyhow, bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Singularity,
    Docker,
}

impl ContainerRuntime {
    pub fn tool_name(self) -> &'static str {
        match self {
            ContainerRuntime::Singularity => "singularity",
            ContainerRuntime::Docker => "docker",
        }
    }

    /// Variable naming the cache directory for the pull script.
    pub fn cache_var(self) -> &'static str {
        match self {
            ContainerRuntime::Singularity => CWL_SINGULARITY_CACHE,
            ContainerRuntime::Docker => CWL_DOCKER_CACHE,
        }
    }

    fn script(self) -> &'static str {
        match self {
            ContainerRuntime::Singularity => templates::CREATE_SINGULARITY_IMAGE_SH,
            ContainerRuntime::Docker => templates::CREATE_DOCKER_IMAGE_SH,
        }
    }
}

/// Workflow checkout root: `<repo>/per-sample/Workflows/x.cwl` maps to `<repo>/per-sample`.
pub fn cwl_dir(workflow_file: &Path) -> PathBuf {
    workflow_file
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Feed `script` to bash over stdin, echo its output and return the exit code.
pub fn run_pull_script(script: &str, env: &[(&str, String)]) -> Result<i32> {
    let mut cmd = Command::new("bash");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().context("spawn bash")?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .context("write pull script")?;
    }
    let output = child.wait_with_output().context("wait pull script")?;
    print!("{}", String::from_utf8_lossy(&output.stdout));
    print!("{}", String::from_utf8_lossy(&output.stderr));
    let code = output.status.code().unwrap_or(-1);
    println!("Pull ExitCode is [{code}]");
    Ok(code)
}

/// Pull every image referenced under the workflow checkout into the cache.
pub fn pull_container_images(ctx: &RunContext, runtime: ContainerRuntime) -> Result<()> {
    let tool = runtime.tool_name();
    if find_tool(tool).is_none() {
        bail!("{tool} command is not found");
    }
    let workflow = &ctx.config().workflow_file.path;
    if !workflow_file_exists(workflow) {
        bail!("workflow file [{workflow}] is missing; stop pulling container images");
    }
    let cache = ctx
        .config()
        .container_cache_dir()
        .ok_or_else(|| anyhow!("container_cache_directory is not set in the config"))?;
    println!("{cache}");

    let cwldir = cwl_dir(Path::new(workflow));
    tracing::info!(runtime = tool, cwldir = %cwldir.display(), cache, "pulling container images");
    let env = [
        ("CWLDIR", cwldir.display().to_string()),
        (runtime.cache_var(), cache.to_string()),
    ];
    let code = run_pull_script(runtime.script(), &env)?;
    if code != 0 {
        bail!("container image pull failed with exit code {code}");
    }
    Ok(())
}
