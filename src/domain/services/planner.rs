//! Sync planning service
//!
//! Pure domain logic for planning tree synchronization.
//! This service determines what to change on the host based on the host
//! manifest, the local tree, the managed scope and the state registry,
//! without performing any I/O.

use std::cmp::Reverse;

use crate::domain::entities::{ConfigTree, HostManifest, StateRegistry};
use crate::domain::value_objects::{ManagedScope, SyncOpKind, SyncOperation};

/// Ordered list of host changes
///
/// Creates and updates come first, sorted by path; deletes come last,
/// deepest paths first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    operations: Vec<SyncOperation>,
}

impl SyncPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &[SyncOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<SyncOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn count(&self, kind: SyncOpKind) -> usize {
        self.operations.iter().filter(|op| op.kind == kind).count()
    }

    pub fn create_count(&self) -> usize {
        self.count(SyncOpKind::Create)
    }

    pub fn update_count(&self) -> usize {
        self.count(SyncOpKind::Update)
    }

    pub fn delete_count(&self) -> usize {
        self.count(SyncOpKind::Delete)
    }

    pub fn has_deletes(&self) -> bool {
        self.delete_count() > 0
    }

    /// The manifest the host would have after applying the whole plan
    pub fn simulate(&self, manifest: &HostManifest) -> HostManifest {
        let mut after = manifest.clone();
        for op in &self.operations {
            match (&op.kind, &op.fingerprint) {
                (SyncOpKind::Delete, _) => {
                    after.remove(&op.path);
                }
                (_, Some(fingerprint)) => after.insert(op.path.clone(), fingerprint.clone()),
                (_, None) => {}
            }
        }
        after
    }
}

/// Pure planning service
pub struct SyncPlanner;

impl SyncPlanner {
    /// Compute the operations that make the host's managed roots match `tree`.
    ///
    /// Paths outside `scope`, and paths the registry classifies as bootstrap
    /// or opaque host state, are never touched in either direction.
    pub fn plan(
        tree: &ConfigTree,
        manifest: &HostManifest,
        scope: &ManagedScope,
        registry: &StateRegistry,
    ) -> SyncPlan {
        let syncable = |path: &str| {
            if !scope.contains(path) {
                return false;
            }
            match registry.host_state_match(path) {
                Some(entity) => {
                    tracing::debug!(path, entity = %entity.name, "host state left alone");
                    false
                }
                None => true,
            }
        };

        let mut operations: Vec<SyncOperation> = tree
            .files()
            .filter(|file| syncable(file.path()))
            .filter_map(|file| match manifest.get(file.path()) {
                None => Some(SyncOperation::create(
                    file.path(),
                    file.fingerprint().clone(),
                )),
                Some(existing) if existing != file.fingerprint() => Some(SyncOperation::update(
                    file.path(),
                    file.fingerprint().clone(),
                )),
                Some(_) => None,
            })
            .collect();

        let mut deletes: Vec<SyncOperation> = manifest
            .iter()
            .filter(|(path, _)| !tree.contains_file(path) && syncable(path))
            .map(|(path, _)| SyncOperation::delete(path))
            .collect();
        deletes.sort_by_key(|op| (Reverse(op.path.matches('/').count()), Reverse(op.path.clone())));

        operations.extend(deletes);
        SyncPlan { operations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ConfigFile;
    use crate::domain::value_objects::Fingerprint;

    fn plan_for(t: &ConfigTree, m: &HostManifest, scope: &ManagedScope) -> SyncPlan {
        SyncPlanner::plan(t, m, scope, &StateRegistry::builtin())
    }

    fn tree(files: &[(&str, &str)]) -> ConfigTree {
        ConfigTree::from_files(
            "config",
            files.iter().map(|(p, c)| ConfigFile::new(*p, *c)),
            None,
        )
        .unwrap()
    }

    fn manifest(entries: &[(&str, &str)]) -> HostManifest {
        entries
            .iter()
            .map(|(p, c)| (p.to_string(), Fingerprint::from_bytes(c.as_bytes())))
            .collect()
    }

    #[test]
    fn empty_host_gets_creates() {
        let plan = plan_for(
            &tree(&[("b.yaml", "b"), ("a.yaml", "a")]),
            &HostManifest::new(),
            &ManagedScope::everything(),
        );
        let paths: Vec<_> = plan.operations().iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["a.yaml", "b.yaml"]);
        assert_eq!(plan.create_count(), 2);
    }

    #[test]
    fn changed_content_is_update_and_same_is_skipped() {
        let plan = plan_for(
            &tree(&[("a.yaml", "new"), ("b.yaml", "same")]),
            &manifest(&[("a.yaml", "old"), ("b.yaml", "same")]),
            &ManagedScope::everything(),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.operations()[0].kind, SyncOpKind::Update);
    }

    #[test]
    fn deletes_come_last_deepest_first() {
        let plan = plan_for(
            &tree(&[("z.yaml", "z")]),
            &manifest(&[
                ("a.yaml", "a"),
                ("packages/old.yaml", "o"),
                ("packages/deep/older.yaml", "o"),
            ]),
            &ManagedScope::everything(),
        );
        let rendered: Vec<_> = plan.operations().iter().map(|o| o.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "create z.yaml",
                "delete packages/deep/older.yaml",
                "delete packages/old.yaml",
                "delete a.yaml",
            ]
        );
    }

    #[test]
    fn host_paths_outside_scope_are_never_deleted() {
        let scope = ManagedScope::new(["configuration.yaml", "packages/"]).unwrap();
        let plan = plan_for(
            &tree(&[("configuration.yaml", "c")]),
            &manifest(&[
                ("configuration.yaml", "c"),
                (".storage/core.entity_registry", "{}"),
                ("packages/removed.yaml", "r"),
            ]),
            &scope,
        );
        let rendered: Vec<_> = plan.operations().iter().map(|o| o.to_string()).collect();
        assert_eq!(rendered, vec!["delete packages/removed.yaml"]);
    }

    #[test]
    fn tree_files_outside_scope_are_not_uploaded() {
        let scope = ManagedScope::new(["configuration.yaml"]).unwrap();
        let plan = plan_for(
            &tree(&[("configuration.yaml", "c"), ("notes.txt", "n")]),
            &HostManifest::new(),
            &scope,
        );
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn simulated_host_needs_no_further_changes() {
        let t = tree(&[("a.yaml", "a"), ("dir/b.yaml", "b")]);
        let before = manifest(&[("a.yaml", "old"), ("gone.yaml", "g")]);
        let scope = ManagedScope::everything();

        let plan = plan_for(&t, &before, &scope);
        let after = plan.simulate(&before);
        assert!(plan_for(&t, &after, &scope).is_empty());
    }

    #[test]
    fn host_state_is_never_deleted_even_in_full_scope() {
        let plan = plan_for(
            &tree(&[("configuration.yaml", "c")]),
            &manifest(&[
                ("configuration.yaml", "c"),
                ("secrets.yaml", "wifi: hunter2"),
                (".storage/core.entity_registry", "{}"),
                (".storage/core.config_entries", "{}"),
                ("home-assistant_v2.db", "sqlite"),
                ("retired.yaml", "r"),
            ]),
            &ManagedScope::everything(),
        );
        let rendered: Vec<_> = plan.operations().iter().map(|o| o.to_string()).collect();
        assert_eq!(rendered, vec!["delete retired.yaml"]);
    }

    #[test]
    fn host_state_in_the_tree_is_not_uploaded() {
        let plan = plan_for(
            &tree(&[("configuration.yaml", "c"), (".cloud/remote.json", "{}")]),
            &HostManifest::new(),
            &ManagedScope::everything(),
        );
        let paths: Vec<_> = plan.operations().iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["configuration.yaml"]);
    }
}
