//! Scenario: A Change the Host Rejects
//!
//! Journey: A good tree is live. The operator pushes a change that passes
//! local validation but the host's own checker rejects.
//!
//! Success Criteria:
//! - The live host keeps serving the good tree
//! - `history --last-success` still points at the good run
//! - Once the checker is happy again the change deploys

use crate::common::*;

#[test]
fn scenario_rejected_change_keeps_host_on_last_good_tree() {
    // The checker rejects any staged tree containing a "broken" marker.
    let env = TestEnv::builder()
        .with_config(&config_with_host_check(
            "! grep -rq BROKEN {path} || { echo 'Invalid config for [script]' >&2; false; }",
        ))
        .with_tree(&valid_tree())
        .build();

    assert_exit_code!(env.run(&["deploy"]), 0);
    let good = env.audit_records()[0].clone();

    env.write_tree_file(
        "scripts.yaml",
        "goodnight:\n  alias: BROKEN\n  sequence: []\n",
    );
    let result = env.run(&["deploy"]);
    assert_exit_code!(result, 2);
    assert_output_contains!(result, "Invalid config for [script]");
    assert_eq!(env.read_host_file("scripts.yaml"), SCRIPTS_YAML);

    let result = env.run(&["history", "--last-success", "--json"]);
    assert_exit_code!(result, 0);
    assert_eq!(result.json_events()[0]["run"]["id"], good["id"]);

    env.write_tree_file(
        "scripts.yaml",
        "goodnight:\n  alias: Fixed\n  sequence: []\n",
    );
    let result = env.run(&["deploy"]);
    assert_exit_code!(result, 0);
    assert!(env.read_host_file("scripts.yaml").contains("Fixed"));
}
