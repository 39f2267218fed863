//! `hapsync check`: local validation and the optional dry-run host check.

#[macro_use]
mod common;

use common::*;

#[test]
fn valid_tree_passes_without_touching_host() {
    let env = TestEnv::builder().with_tree(&valid_tree()).build();

    let result = env.run(&["check"]);

    assert_exit_code!(result, 0);
    assert_output_contains!(result, "All checks passed");
    assert!(list_all_files(&env.host_path("")).is_empty());
}

#[test]
fn unresolved_include_fails_with_location() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_tree_file("configuration.yaml", BROKEN_INCLUDE_CONFIGURATION)
        .build();

    let result = env.run(&["check"]);

    assert_exit_code!(result, 1);
    assert_output_contains!(result, "mqtt.yaml");
    assert_output_contains!(result, "Check failed");
}

#[test]
fn malformed_yaml_is_reported() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_tree_file("scripts.yaml", "goodnight:\n  sequence: [unclosed\n")
        .build();

    let result = env.run(&["check"]);

    assert_exit_code!(result, 1);
    assert_output_contains!(result, "scripts.yaml");
}

#[test]
fn host_check_runs_against_staged_copy() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_host_file("configuration.yaml", "homeassistant:\n  name: Live\n")
        .build();

    let result = env.run(&["check", "--host"]);

    assert_exit_code!(result, 0);
    assert_eq!(
        env.read_host_file("configuration.yaml"),
        "homeassistant:\n  name: Live\n",
        "live configuration must not change during a check"
    );
    assert_not_on_host!(env, "automations.yaml");
}

#[test]
fn host_check_rejection_fails_check() {
    let env = TestEnv::builder()
        .with_config(&rejecting_host_check_config())
        .with_tree(&valid_tree())
        .build();

    let result = env.run(&["check", "--host"]);

    assert_exit_code!(result, 1);
    assert_output_contains!(result, "Invalid config for [automation]");
}

#[test]
fn unreachable_host_degrades_unless_required() {
    let env = TestEnv::builder().with_tree(&valid_tree()).build();
    let missing_host = [("HAPSYNC_HOST_PATH", "does-not-exist")];

    let auto = env.run_with_env(&["check", "--host"], &missing_host);
    assert_exit_code!(auto, 0);
    assert_output_contains!(auto, "host check unavailable");

    let required = env.run_with_env(&["check", "--host", "--require-host"], &missing_host);
    assert_exit_code!(required, 1);
}

#[test]
fn json_output_ends_with_complete_event() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_tree_file("configuration.yaml", BROKEN_INCLUDE_CONFIGURATION)
        .build();

    let result = env.run(&["check", "--json"]);

    assert_exit_code!(result, 1);
    let events = result.json_events();
    assert!(events.iter().all(|e| e["command"] == "check"));
    assert!(events
        .iter()
        .any(|e| e["event"] == "error" && e["finding"]["kind"] == "unresolved_reference"));
    let last = events.last().unwrap();
    assert_eq!(last["event"], "complete");
    assert_eq!(last["status"], "fail");
    assert_eq!(last["success"], false);
}
