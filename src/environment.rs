//! Host environment recognition.
//!
//! Detects python virtualenvs and locates the external tools the job manager
//! shells out to.
use crate::config::ReferenceConfig;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_RUNNER: &str = "toil-cwl-runner";

/// Set for the runner when it executes inside a virtualenv.
pub const TOIL_CHECK_ENV: &str = "TOIL_CHECK_ENV";
/// Points the runner at pre-pulled singularity images.
pub const CWL_SINGULARITY_CACHE: &str = "CWL_SINGULARITY_CACHE";
pub const CWL_DOCKER_CACHE: &str = "CWL_DOCKER_CACHE";

fn env_is_set(key: &str) -> bool {
    env::var_os(key).is_some_and(|value| !value.is_empty())
}

pub fn in_conda_env() -> bool {
    env_is_set("CONDA_DEFAULT_ENV")
}

pub fn in_python_virtualenv() -> bool {
    env_is_set("VIRTUAL_ENV")
}

pub fn in_virtualenv() -> bool {
    in_conda_env() || in_python_virtualenv()
}

/// Resolve a tool name or path to an executable, if one exists.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Extra variables injected into the runner's inherited environment.
pub fn runner_env(config: &ReferenceConfig, virtualenv: bool) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    if virtualenv {
        vars.push((TOIL_CHECK_ENV.to_string(), "True".to_string()));
    }
    if let Some(cache) = config.container_cache_dir() {
        vars.push((CWL_SINGULARITY_CACHE.to_string(), cache.to_string()));
    }
    vars
}

fn describe_tool(label: &str, name: &str) {
    match find_tool(name) {
        Some(path) => println!("{label}: {}", path.display()),
        None => println!("{label}: not found ({name})"),
    }
}

/// Print what the job manager recognizes about the host.
pub fn display_recognition(config: &ReferenceConfig, runner: &str) {
    println!("Virtualenv:");
    println!("  conda (CONDA_DEFAULT_ENV): {}", in_conda_env());
    println!("  python (VIRTUAL_ENV): {}", in_python_virtualenv());
    println!("Commands:");
    describe_tool("  workflow runner", runner);
    describe_tool("  singularity", "singularity");
    describe_tool("  docker", "docker");
    describe_tool("  slurm (sbatch)", "sbatch");
    match config.container_cache_dir() {
        Some(cache) => println!("Container cache directory: {cache}"),
        None => println!("Container cache directory: <none>"),
    }
}
