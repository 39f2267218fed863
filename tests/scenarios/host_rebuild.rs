//! Scenario: Rebuilding a Host From the Tree
//!
//! Journey: The host's storage died. The operator installs a fresh host
//! (empty configuration directory) and redeploys.
//!
//! Success Criteria:
//! - Every managed file is restored by a single deploy
//! - `state` tells the operator which concerns need manual setup

use crate::common::*;

#[test]
fn scenario_rebuild_restores_managed_files() {
    let env = TestEnv::builder()
        .with_tree(&valid_tree())
        .with_tree_file("packages/heating.yaml", "climate: []\n")
        .build();
    assert_exit_code!(env.run(&["deploy"]), 0);

    std::fs::remove_dir_all(env.host_path("")).unwrap();
    std::fs::create_dir_all(env.host_path("")).unwrap();

    let result = env.run(&["deploy"]);
    assert_exit_code!(result, 0);
    for (path, content) in valid_tree() {
        assert_eq!(env.read_host_file(path), content, "{} restored", path);
    }
    assert_on_host!(env, "packages/heating.yaml");

    let result = env.run(&["state", "--class", "bootstrap"]);
    assert_exit_code!(result, 0);
    assert_output_contains!(result, "owner account");
}
