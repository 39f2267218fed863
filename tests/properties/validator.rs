//! Property tests for tree validation.

use proptest::prelude::*;

use hapsync::domain::entities::{ConfigFile, ConfigTree, Shape, StateRegistry};
use hapsync::domain::services::{validate, FileRole, ValidationErrorKind, ValidationOptions};

fn package_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,8}").unwrap()
}

/// One broken file: its body, the kind of error it must produce, and
/// whether it needs a schema role to be checked against
fn broken_file(flaw: u8, i: usize) -> (String, ValidationErrorKind, bool) {
    match flaw % 4 {
        0 => (
            format!("sensor: !include missing_{}.yaml\n", i),
            ValidationErrorKind::UnresolvedReference,
            false,
        ),
        1 => (
            format!("wifi: !secret ssid_{}\n", i),
            ValidationErrorKind::UnresolvedReference,
            false,
        ),
        2 => (
            "light: [unclosed\n".to_string(),
            ValidationErrorKind::Malformed,
            false,
        ),
        _ => (
            "- not\n- a mapping\n".to_string(),
            ValidationErrorKind::SchemaViolation,
            true,
        ),
    }
}

fn tree(files: Vec<(String, String)>) -> ConfigTree {
    ConfigTree::from_files(
        "config",
        files.into_iter().map(|(p, c)| ConfigFile::new(p, c)),
        None,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Validation never panics, whatever a file contains.
    #[test]
    fn property_validate_never_panics(
        content in "(?s).{0,256}",
        name in package_name(),
    ) {
        let tree = tree(vec![
            ("configuration.yaml".to_string(), content.clone()),
            (format!("packages/{}.yaml", name), content),
        ]);
        let _ = validate(&tree, &StateRegistry::builtin(), &ValidationOptions::default());
    }

    /// PROPERTY: Every dangling include is reported, one error per include.
    #[test]
    fn property_every_missing_include_reported(
        names in prop::collection::btree_set(package_name(), 1..6),
    ) {
        let mut configuration = String::from("homeassistant: {}\n");
        for name in &names {
            configuration.push_str(&format!("{}: !include missing/{}.yaml\n", name, name));
        }
        let tree = tree(vec![("configuration.yaml".to_string(), configuration)]);

        let report = validate(&tree, &StateRegistry::builtin(), &ValidationOptions::default());

        let unresolved: Vec<_> = report
            .errors_of(ValidationErrorKind::UnresolvedReference)
            .collect();
        prop_assert_eq!(unresolved.len(), names.len());
        for name in &names {
            let target = format!("missing/{}.yaml", name);
            prop_assert!(unresolved.iter().any(|e| e.message.contains(&target)));
        }
    }

    /// PROPERTY: N files with one flaw each yield N errors, one per file,
    /// whatever mix of flaws and however many workers share them.
    #[test]
    fn property_one_error_per_broken_file(
        flaws in prop::collection::vec(0u8..4, 1..12),
        workers in 1usize..6,
    ) {
        let mut files = Vec::new();
        let mut expected = Vec::new();
        let mut roles = FileRole::defaults();
        for (i, flaw) in flaws.iter().enumerate() {
            let path = format!("packages/f{:02}.yaml", i);
            let (body, kind, needs_role) = broken_file(*flaw, i);
            if needs_role {
                roles.push(FileRole::new(path.clone(), Shape::Mapping));
            }
            files.push((path.clone(), body));
            expected.push((path, kind));
        }
        let options = ValidationOptions { roles, workers, ..ValidationOptions::default() };

        let report = validate(&tree(files), &StateRegistry::builtin(), &options);

        prop_assert_eq!(report.errors().len(), flaws.len());
        for (path, kind) in &expected {
            let in_file: Vec<_> = report.errors().iter().filter(|e| &e.file == path).collect();
            prop_assert_eq!(in_file.len(), 1, "{}: {:?}", path, in_file);
            prop_assert_eq!(in_file[0].kind, *kind);
        }
    }

    /// PROPERTY: The report does not depend on the worker count.
    #[test]
    fn property_report_is_worker_independent(
        bodies in prop::collection::vec("(?s).{0,64}", 1..12),
        workers in 2usize..6,
    ) {
        let files: Vec<(String, String)> = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| (format!("packages/p{:02}.yaml", i), body))
            .collect();
        let tree = tree(files);
        let registry = StateRegistry::builtin();

        let serial = ValidationOptions { workers: 1, ..ValidationOptions::default() };
        let parallel = ValidationOptions { workers, ..ValidationOptions::default() };

        prop_assert_eq!(
            validate(&tree, &registry, &serial),
            validate(&tree, &registry, &parallel)
        );
    }
}
