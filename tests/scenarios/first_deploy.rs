//! Scenario: First Deploy and Iteration
//!
//! Journey: An operator moves a hand-edited host to a versioned tree.
//!
//! Steps:
//! 1. Checks the tree locally and against the host
//! 2. Previews the plan
//! 3. Deploys
//! 4. Edits an automation and redeploys (update)
//! 5. Retires a package and redeploys (delete)
//! 6. Reviews the history
//!
//! Success Criteria:
//! - Host ends up byte-identical to the tree
//! - Every deploy is audited, plan is not

use crate::common::*;

#[test]
fn scenario_first_deploy_then_iterate() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_tree_file("packages/porch.yaml", "input_boolean:\n  porch_away: {}\n")
        .with_host_file("configuration.yaml", "homeassistant:\n  name: Hand edited\n")
        .build();

    // Step 1
    let result = env.run(&["check", "--host"]);
    assert_exit_code!(result, 0);

    // Step 2
    let result = env.run(&["plan"]);
    assert_exit_code!(result, 0);
    assert_output_contains!(result, "~ configuration.yaml");
    assert_output_contains!(result, "+ packages/porch.yaml");

    // Step 3
    let result = env.run(&["deploy"]);
    assert_exit_code!(result, 0);
    assert_eq!(env.read_host_file("configuration.yaml"), CONFIGURATION_YAML);

    // Step 4
    let edited = AUTOMATIONS_YAML.replace("light.porch", "light.porch_main");
    env.write_tree_file("automations.yaml", &edited);
    let result = env.run(&["deploy", "--json"]);
    assert_exit_code!(result, 0);
    let planned = result
        .json_events()
        .into_iter()
        .find(|e| e["event"] == "planned")
        .unwrap();
    assert_eq!(planned["updates"], 1);
    assert_eq!(planned["creates"], 0);
    assert_eq!(env.read_host_file("automations.yaml"), edited);

    // Step 5
    env.remove_tree_file("packages/porch.yaml");
    let result = env.run(&["deploy", "--yes"]);
    assert_exit_code!(result, 0);
    assert_not_on_host!(env, "packages/porch.yaml");

    // Step 6
    let statuses: Vec<String> = env
        .audit_records()
        .iter()
        .map(|r| r["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, vec!["deployed", "deployed", "deployed"]);

    let result = env.run(&["plan"]);
    assert_output_contains!(result, "Host already matches the tree");
}
