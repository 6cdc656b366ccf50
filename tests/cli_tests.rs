// ABOUTME: Integration tests for the CLI application
// ABOUTME: Tests command-line interface functionality and end-to-end workflow runs

use std::process::{Command, Output};
use tokio::fs;

mod common;
use common::{read_json_output, TestEnvironment, TestGraphBuilder};

use stepwise::parser::{WorkflowResponse, WorkflowStep};
use stepwise::payload::Activity;

fn stepwise(env: &TestEnvironment, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stepwise"))
        .args(args)
        .current_dir(env.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn approval_graph() -> TestGraphBuilder {
    TestGraphBuilder::new()
        .add_step(
            WorkflowStep::new("submit", "STANDARD.NOOP")
                .with_send_to("manager")
                .with_response(WorkflowResponse::new("STANDARD.ALWAYS", "review")),
        )
        .add_input_step("review", "STANDARD.NOOP")
}

#[test]
fn test_cli_help_command() {
    let env = TestEnvironment::new();
    let output = stepwise(&env, &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stepwise"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("routes"));
}

#[test]
fn test_cli_version_command() {
    let env = TestEnvironment::new();
    let output = stepwise(&env, &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(stepwise::VERSION));
}

#[test]
fn test_cli_lists_builtin_routes() {
    let env = TestEnvironment::new();
    let output = stepwise(&env, &["routes"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("STANDARD.NOOP"));
    assert!(stdout.contains("STANDARD.FIELD_CHECK"));
}

#[test]
fn test_cli_lists_routes_as_json() {
    let env = TestEnvironment::new();
    let output = stepwise(&env, &["routes", "--json"]);

    assert!(output.status.success());
    let routes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let always = routes
        .as_array()
        .unwrap()
        .iter()
        .find(|route| route["key"] == "STANDARD.ALWAYS")
        .expect("ALWAYS route listed");
    assert_eq!(always["decision"], true);
    assert_eq!(always["action"], false);
}

#[tokio::test]
async fn test_cli_lists_steps() {
    let env = TestEnvironment::new();
    let graph_file = env.create_graph_file("approval", &approval_graph()).await;

    let output = stepwise(&env, &["steps", graph_file.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("submit [STANDARD.NOOP]"));
    assert!(stdout.contains("STANDARD.ALWAYS -> review"));
    assert!(stdout.contains("review [STANDARD.NOOP] (user input)"));
}

#[tokio::test]
async fn test_cli_run_writes_output_and_thread() {
    let env = TestEnvironment::new();
    let graph_file = env.create_graph_file("approval", &approval_graph()).await;
    let payload_file = env.file("payload.json");
    let output_file = env.file("result.json");
    let thread_file = env.file("thread.jsonl");
    fs::write(
        &payload_file,
        r#"{ "from": "alice", "context": { "manager": "bob" } }"#,
    )
    .await
    .unwrap();

    let output = stepwise(
        &env,
        &[
            "run",
            graph_file.to_str().unwrap(),
            "--payload",
            payload_file.to_str().unwrap(),
            "--set",
            "status=open",
            "--activity",
            "act-42",
            "--thread",
            thread_file.to_str().unwrap(),
            "--output",
            output_file.to_str().unwrap(),
        ],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result = read_json_output(&output_file).await.unwrap();
    assert_eq!(result["outcome"]["status"], "awaiting_input");
    assert_eq!(result["outcome"]["step"]["id"], "review");
    let finished = &result["outcome"]["step"]["payload"];
    assert_eq!(finished["status"], "open");
    assert_eq!(finished["activityID"], "act-42");
    assert_eq!(finished["to"], serde_json::json!(["bob"]));

    let mut activity = Activity::default();
    assert_eq!(activity.load_thread_file(&thread_file).unwrap(), 2);
    assert_eq!(activity.thread[0].envelope.workflow_id(), "submit");
}

#[tokio::test]
async fn test_cli_run_unknown_step_fails() {
    let env = TestEnvironment::new();
    let graph_file = env.create_graph_file("approval", &approval_graph()).await;

    let output = stepwise(
        &env,
        &["run", graph_file.to_str().unwrap(), "--step", "nowhere"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Step not found: nowhere"));
}

#[tokio::test]
async fn test_cli_run_rejects_bad_variable() {
    let env = TestEnvironment::new();
    let graph_file = env.create_graph_file("approval", &approval_graph()).await;

    let output = stepwise(
        &env,
        &["run", graph_file.to_str().unwrap(), "--set", "novalue"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid variable format"));
}
