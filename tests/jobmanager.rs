//! End-to-end tests driving the `jobmanager` binary against a temp workspace.

mod common;

use common::{stdout, Workspace};
use std::fs;

const THREE_SAMPLES: &[(&str, &[&str])] = &[
    ("XX00001", &["YYY0000001"]),
    ("XX00002", &["YYY0000002", "YYY0000012"]),
    ("XX00003", &["YYY0000003"]),
];

const ONE_SAMPLE: &[(&str, &[&str])] = &[("XX00000", &["YYY0000000"])];

#[test]
fn dry_run_lists_only_unfinished_samples() {
    let ws = Workspace::new(THREE_SAMPLES);
    ws.complete_sample("XX00001");

    let output = ws.jobmanager("dry-run", &[]);
    assert!(output.status.success(), "dry-run failed: {output:?}");
    let text = stdout(&output);
    assert!(!text.contains("SampleId: XX00001 will be executed"));
    assert!(text.contains("index: 1, SampleId: XX00002 will be executed"));
    assert!(text.contains("index: 2, SampleId: XX00003 will be executed"));
    assert!(text.contains("[2/3] task will be executed."));
    assert!(ws.job_manager_dir().is_dir());
    assert!(ws.invocations().is_empty());
}

#[test]
fn run_flag_dry_run_copies_input_documents() {
    let ws = Workspace::new(THREE_SAMPLES);
    let output = ws.jobmanager("run", &["-n"]);
    assert!(output.status.success(), "run -n failed: {output:?}");
    assert!(stdout(&output).contains("[3/3] task will be executed."));
    assert!(ws.output_root().join("samplesheet.json").is_file());
    assert!(ws.output_root().join("configfile.json").is_file());
}

#[test]
fn show_job_progress_summarizes_counts() {
    let ws = Workspace::new(THREE_SAMPLES);
    ws.complete_sample("XX00001");

    let output = ws.jobmanager("show-job-progress", &[]);
    assert!(output.status.success(), "show-job-progress failed: {output:?}");
    let text = stdout(&output);
    assert!(text.contains("XX00001 is finished."));
    assert!(text.contains("XX00002 will be executed"));
    assert!(text.contains("1/3 finished"));
    assert!(text.lines().any(|line| line == "2 will be executed"));

    let only_finished = stdout(&ws.jobmanager("show-job-progress", &["--only-finished"]));
    assert!(only_finished.contains("XX00001 is finished."));
    assert!(!only_finished.contains("XX00002 will be executed"));
    assert!(only_finished.contains("1/3 finished"));

    let only_new = stdout(&ws.jobmanager("show-job-progress", &["--only-new"]));
    assert!(!only_new.contains("XX00001 is finished."));
    assert!(only_new.contains("XX00003 will be executed"));
}

#[test]
fn missing_fastq_fails_setup_unless_existence_check_is_off() {
    let ws = Workspace::new(THREE_SAMPLES);
    fs::remove_file(ws.fastq("YYY0000003", 2)).expect("remove fastq");

    let output = ws.jobmanager("dry-run", &[]);
    assert_eq!(output.status.code(), Some(1));

    let output = ws.jobmanager("dry-run", &["--file-exists-check", "false"]);
    assert!(output.status.success(), "dry-run failed: {output:?}");
}

#[test]
fn missing_reference_secondary_file_is_fatal() {
    let ws = Workspace::new(THREE_SAMPLES);
    fs::remove_file(ws.root().join("ref/genome.dict")).expect("remove dict");
    let output = ws.jobmanager("dry-run", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("genome.dict"));
}

#[test]
fn missing_config_document_is_fatal() {
    let ws = Workspace::new(THREE_SAMPLES);
    fs::remove_file(ws.config_path()).expect("remove config");
    let output = ws.jobmanager("show-job-progress", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("is missing config file"));
}

#[test]
fn real_run_without_runner_is_fatal() {
    let ws = Workspace::new(THREE_SAMPLES);
    let output = ws.jobmanager("run", &["--runner", "definitely-not-a-workflow-runner"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(ws.invocations().is_empty());
}

#[test]
fn generate_sample_list_writes_yaml() {
    let ws = Workspace::new(THREE_SAMPLES);
    let output = ws.jobmanager("generate-sample-list", &[]);
    assert!(output.status.success(), "generate-sample-list failed: {output:?}");
    let list = ws.output_root().join("sample_list.yaml");
    assert!(stdout(&output).contains(&list.display().to_string()));
    assert_eq!(
        fs::read_to_string(list).expect("read sample list"),
        "- XX00001\n- XX00002\n- XX00003\n"
    );
}

#[cfg(unix)]
#[test]
fn successful_run_leaves_nothing_pending() {
    let ws = Workspace::new(THREE_SAMPLES);
    ws.complete_sample("XX00001");
    let runner = ws.write_runner("runner.sh", &common::producing_runner_body());
    let runner = runner.display().to_string();

    let output = ws.jobmanager("run", &["--runner", &runner]);
    assert!(output.status.success(), "run failed: {output:?}");
    let text = stdout(&output);
    assert!(text.contains("SampleId: XX00002 is successfully finished"));
    assert!(text.contains("SampleId: XX00003 is successfully finished"));
    assert!(text.contains("[2/2] task finished successfully."));
    assert!(text.trim_end().ends_with("fin"));

    let invocations = ws.invocations();
    assert_eq!(invocations.len(), 1);
    let mut leaves = fs::read_dir(&invocations[0])
        .expect("read invocation")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    leaves.sort();
    assert_eq!(leaves, vec!["XX00002", "XX00003"]);
    let leaf = invocations[0].join("XX00002");
    assert_eq!(
        fs::read_to_string(leaf.join("toil.exitcode.txt")).expect("read exit code"),
        "0\n"
    );
    assert_eq!(
        fs::read_to_string(leaf.join("toil.stdout.txt")).expect("read stdout"),
        "finished XX00002\n"
    );

    let progress = stdout(&ws.jobmanager("show-job-progress", &[]));
    assert!(progress.contains("3/3 finished"));
    assert!(progress.lines().any(|line| line == "0 will be executed"));
}

#[cfg(unix)]
#[test]
fn failing_runner_is_reported_per_sample() {
    let ws = Workspace::new(THREE_SAMPLES);
    let runner = ws.write_runner("runner.sh", "echo broken >&2\nexit 3");
    let runner = runner.display().to_string();

    let output = ws.jobmanager("run", &["--runner", &runner, "--max-parallel", "2"]);
    assert!(output.status.success(), "run failed: {output:?}");
    let text = stdout(&output);
    for id in ["XX00001", "XX00002", "XX00003"] {
        assert!(text.contains(&format!("SampleId: {id} is fail. exitcode = 3")));
    }
    assert!(text.contains("[0/3] task finished successfully."));
    assert!(text.contains("toil.stderr.txt"));

    let progress = stdout(&ws.jobmanager("show-job-progress", &[]));
    assert!(progress.contains("Sample ID: [XX00002] has error"));
    assert!(progress.contains(" ExitCode: [3]"));
    assert!(progress.contains("0/3 finished"));
}

#[cfg(unix)]
#[test]
fn zero_exit_without_results_is_a_failure() {
    let ws = Workspace::new(ONE_SAMPLE);
    let runner = ws.write_runner("runner.sh", "exit 0");
    let runner = runner.display().to_string();

    let output = ws.jobmanager("run", &["--runner", &runner]);
    assert!(output.status.success(), "run failed: {output:?}");
    let text = stdout(&output);
    assert!(text.contains("SampleId: XX00000 is fail. exitcode = 0 but result files are missing"));
    assert!(!text.contains("successfully finished"));

    let progress = stdout(&ws.jobmanager("show-job-progress", &[]));
    assert!(progress.contains("Something wrong SampleId[XX00000] is exitcode 0."));
    assert!(progress.lines().any(|line| line == "1 will be executed"));
}
