//! Property tests for sync planning.

use std::collections::BTreeMap;

use proptest::prelude::*;

use hapsync::domain::entities::{ConfigFile, ConfigTree, HostManifest, StateRegistry};
use hapsync::domain::services::SyncPlanner;
use hapsync::domain::value_objects::{Fingerprint, ManagedScope, SyncOpKind};

fn tree_path() -> impl Strategy<Value = String> {
    let dir = prop::sample::select(vec!["", "packages/", "packages/lights/", "www/", "scripts/"]);
    let name = prop::sample::select(vec!["a", "b", "c", "d"]);
    (dir, name).prop_map(|(dir, name)| format!("{}{}.yaml", dir, name))
}

fn files() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(tree_path(), "[a-z]{0,3}", 0..10)
}

/// Runtime-owned files a live host always has next to the managed tree
fn host_state_path() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "secrets.yaml",
        ".storage/core.entity_registry",
        ".storage/core.config_entries",
        "home-assistant_v2.db",
        ".cloud/remote.json",
    ])
    .prop_map(str::to_string)
}

fn host_files() -> impl Strategy<Value = BTreeMap<String, String>> {
    (
        files(),
        prop::collection::btree_map(host_state_path(), "[a-z]{1,3}", 0..4),
    )
        .prop_map(|(mut tree_like, state)| {
            tree_like.extend(state);
            tree_like
        })
}

fn plan_sync(
    tree: &ConfigTree,
    manifest: &HostManifest,
    scope: &ManagedScope,
) -> hapsync::domain::services::SyncPlan {
    SyncPlanner::plan(tree, manifest, scope, &StateRegistry::builtin())
}

fn scope() -> impl Strategy<Value = ManagedScope> {
    prop_oneof![
        Just(ManagedScope::everything()),
        Just(ManagedScope::new(["packages", "a.yaml", "b.yaml"]).unwrap()),
        Just(ManagedScope::new(["scripts", "www"]).unwrap()),
    ]
}

fn tree_of(files: &BTreeMap<String, String>) -> ConfigTree {
    ConfigTree::from_files(
        "config",
        files.iter().map(|(p, c)| ConfigFile::new(p.as_str(), c.as_bytes())),
        None,
    )
    .unwrap()
}

fn manifest_of(files: &BTreeMap<String, String>) -> HostManifest {
    files
        .iter()
        .map(|(p, c)| (p.clone(), Fingerprint::from_bytes(c.as_bytes())))
        .collect()
}

/// Apply a plan to a manifest the way a host would end up
fn apply(manifest: &mut HostManifest, tree: &ConfigTree, plan: &hapsync::domain::services::SyncPlan) {
    for op in plan.operations() {
        match op.kind {
            SyncOpKind::Create | SyncOpKind::Update => {
                let file = tree.get(&op.path).unwrap();
                manifest.insert(op.path.clone(), file.fingerprint().clone());
            }
            SyncOpKind::Delete => {
                manifest.remove(&op.path);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Applying a plan converges; planning again yields nothing.
    #[test]
    fn property_sync_converges(
        local in files(),
        host in host_files(),
        scope in scope(),
    ) {
        let tree = tree_of(&local);
        let mut manifest = manifest_of(&host);

        let plan = plan_sync(&tree, &manifest, &scope);
        apply(&mut manifest, &tree, &plan);

        let again = plan_sync(&tree, &manifest, &scope);
        prop_assert!(again.is_empty(), "second plan not empty: {:?}", again.operations());
    }

    /// PROPERTY: Nothing outside the managed roots is ever touched.
    #[test]
    fn property_plan_stays_in_scope(
        local in files(),
        host in host_files(),
        scope in scope(),
    ) {
        let tree = tree_of(&local);
        let plan = plan_sync(&tree, &manifest_of(&host), &scope);
        for op in plan.operations() {
            prop_assert!(scope.contains(&op.path), "{} outside scope", op.path);
        }
    }

    /// PROPERTY: Uploads come before deletes, and each path appears once.
    #[test]
    fn property_uploads_precede_deletes(
        local in files(),
        host in host_files(),
    ) {
        let tree = tree_of(&local);
        let plan = plan_sync(&tree, &manifest_of(&host), &ManagedScope::everything());

        let first_delete = plan
            .operations()
            .iter()
            .position(|op| op.kind == SyncOpKind::Delete)
            .unwrap_or(plan.len());
        prop_assert!(plan.operations()[first_delete..]
            .iter()
            .all(|op| op.kind == SyncOpKind::Delete));

        let mut seen = std::collections::BTreeSet::new();
        for op in plan.operations() {
            prop_assert!(seen.insert(op.path.clone()), "{} planned twice", op.path);
        }
    }

    /// PROPERTY: Secrets and runtime state on the host are never planned.
    #[test]
    fn property_host_state_is_never_touched(
        local in files(),
        host in host_files(),
        scope in scope(),
    ) {
        let registry = StateRegistry::builtin();
        let tree = tree_of(&local);
        let plan = plan_sync(&tree, &manifest_of(&host), &scope);
        for op in plan.operations() {
            prop_assert!(
                registry.host_state_match(&op.path).is_none(),
                "{} is host state",
                op.path
            );
        }
    }
}
