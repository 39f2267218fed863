//! State classification registry
//!
//! Names every host-side concern and says whether a redeploy of the tree
//! restores it (`Managed`), an operator must set it up once by hand
//! (`BootstrapState`), or it only ever lives in the running host
//! (`OpaqueState`). The registry is maintained by hand; it is not derived
//! from the host.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::config_tree::ConfigTree;
use crate::domain::value_objects::{EntityClassification, ManagedScope, PathPatterns};
use crate::error::{HapError, HapResult};

/// One named host-side concern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    pub classification: EntityClassification,
    #[serde(default)]
    pub description: String,
    /// Gitignore-style path patterns. For managed entities these describe
    /// where the entity lives in the tree; for opaque state they mark files
    /// that must never be committed.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl EntityDefinition {
    pub fn new(
        name: impl Into<String>,
        classification: EntityClassification,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            classification,
            description: description.into(),
            paths: Vec::new(),
        }
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone)]
struct RegisteredEntity {
    definition: EntityDefinition,
    patterns: PathPatterns,
}

/// Lookup table of classified entities, keyed by name
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    entities: BTreeMap<String, RegisteredEntity>,
}

impl StateRegistry {
    /// Build a registry. Fails on duplicate names or unusable path patterns.
    pub fn new<I>(definitions: I) -> HapResult<Self>
    where
        I: IntoIterator<Item = EntityDefinition>,
    {
        Self::default().extended(definitions)
    }

    /// The home-automation defaults
    pub fn builtin() -> Self {
        Self::new(builtin_entities()).expect("built-in registry entries are valid")
    }

    /// Add more entities. Names already present are rejected.
    pub fn extended<I>(mut self, definitions: I) -> HapResult<Self>
    where
        I: IntoIterator<Item = EntityDefinition>,
    {
        for definition in definitions {
            let name = definition.name.trim().to_string();
            if name.is_empty() {
                return Err(HapError::InvalidPattern {
                    pattern: String::new(),
                    message: "registry entity names must not be empty".to_string(),
                });
            }
            if self.entities.contains_key(&name) {
                return Err(HapError::DuplicateEntity { name });
            }
            let patterns = PathPatterns::new(&definition.paths)?;
            self.entities.insert(
                name.clone(),
                RegisteredEntity {
                    definition: EntityDefinition {
                        name,
                        ..definition
                    },
                    patterns,
                },
            );
        }
        Ok(self)
    }

    pub fn classify(&self, name: &str) -> Option<EntityClassification> {
        self.entities
            .get(name)
            .map(|e| e.definition.classification)
    }

    pub fn entities_of(&self, classification: EntityClassification) -> BTreeSet<String> {
        self.entities
            .values()
            .filter(|e| e.definition.classification == classification)
            .map(|e| e.definition.name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.get(name).map(|e| &e.definition)
    }

    /// All definitions in name order
    pub fn iter(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.entities.values().map(|e| &e.definition)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First opaque-state entity (by name) whose markers match `path`
    pub fn opaque_match(&self, path: &str) -> Option<&EntityDefinition> {
        self.entities
            .values()
            .filter(|e| e.definition.classification == EntityClassification::OpaqueState)
            .find(|e| e.patterns.matches(path))
            .map(|e| &e.definition)
    }

    /// First bootstrap or opaque entity (by name) whose paths match `path`.
    ///
    /// Sync never creates, overwrites or deletes such a path.
    pub fn host_state_match(&self, path: &str) -> Option<&EntityDefinition> {
        self.entities
            .values()
            .filter(|e| e.definition.classification != EntityClassification::Managed)
            .find(|e| e.patterns.matches(path))
            .map(|e| &e.definition)
    }

    /// Scope made of every managed entity's literal paths. Glob patterns
    /// cannot name a root and are left out.
    pub fn managed_scope(&self) -> HapResult<ManagedScope> {
        let roots: Vec<&str> = self
            .entities
            .values()
            .filter(|e| e.definition.classification == EntityClassification::Managed)
            .flat_map(|e| e.definition.paths.iter())
            .map(String::as_str)
            .filter(|p| !p.is_empty() && !p.contains(['*', '?', '[', '!']))
            .collect();
        ManagedScope::new(roots)
    }

    /// Managed entities that declare paths but have no file in `tree`
    pub fn verify_tree(&self, tree: &ConfigTree) -> Vec<&EntityDefinition> {
        self.entities
            .values()
            .filter(|e| e.definition.classification == EntityClassification::Managed)
            .filter(|e| !e.patterns.is_empty())
            .filter(|e| !tree.paths().any(|path| e.patterns.matches(path)))
            .map(|e| &e.definition)
            .collect()
    }
}

fn builtin_entities() -> Vec<EntityDefinition> {
    use EntityClassification::{BootstrapState, Managed, OpaqueState};

    vec![
        // Reproducible from the tree
        EntityDefinition::new("core configuration", Managed, "Top-level configuration.yaml")
            .with_paths(["configuration.yaml"]),
        EntityDefinition::new("automation rules", Managed, "Automations defined in YAML")
            .with_paths(["automations.yaml", "automations/"]),
        EntityDefinition::new("scripts", Managed, "Scripts defined in YAML")
            .with_paths(["scripts.yaml", "scripts/"]),
        EntityDefinition::new("scenes", Managed, "Scenes defined in YAML")
            .with_paths(["scenes.yaml", "scenes/"]),
        EntityDefinition::new("packages", Managed, "Package bundles").with_paths(["packages/"]),
        EntityDefinition::new("blueprints", Managed, "Automation and script blueprints")
            .with_paths(["blueprints/"]),
        EntityDefinition::new("yaml dashboards", Managed, "Dashboards in YAML mode")
            .with_paths(["ui-lovelace.yaml", "dashboards/"]),
        EntityDefinition::new("themes", Managed, "Frontend themes").with_paths(["themes/"]),
        EntityDefinition::new("customizations", Managed, "Entity customizations")
            .with_paths(["customize.yaml"]),
        // One-time manual setup
        EntityDefinition::new(
            "owner account",
            BootstrapState,
            "Created through onboarding in the web UI",
        ),
        EntityDefinition::new(
            "integration config entries",
            BootstrapState,
            "Integrations set up through the UI config flow",
        )
        .with_paths([".storage/core.config_entries"]),
        EntityDefinition::new(
            "secret values",
            BootstrapState,
            "Real values for the names declared in the secrets template",
        )
        .with_paths(["secrets.yaml"]),
        EntityDefinition::new(
            "external credentials",
            BootstrapState,
            "OAuth tokens and cloud account links",
        )
        .with_paths([".storage/application_credentials", ".cloud/"]),
        // Runtime only
        EntityDefinition::new(
            "device pairings",
            OpaqueState,
            "Radio network membership and device registry",
        )
        .with_paths([".storage/core.device_registry", "zigbee.db*", "zwave*.json"]),
        EntityDefinition::new("entity registry", OpaqueState, "Entity ids, names and areas")
            .with_paths([".storage/core.entity_registry", ".storage/core.area_registry"]),
        EntityDefinition::new("historical metrics", OpaqueState, "Recorder database")
            .with_paths(["home-assistant_v2.db*"]),
        EntityDefinition::new("runtime restore state", OpaqueState, "Last known entity states")
            .with_paths([".storage/core.restore_state"]),
        EntityDefinition::new(
            "authentication sessions",
            OpaqueState,
            "Users, refresh tokens and login providers",
        )
        .with_paths([".storage/auth", ".storage/auth_provider.*", ".storage/onboarding"]),
        EntityDefinition::new("ui dashboards", OpaqueState, "Dashboards edited in the UI")
            .with_paths([".storage/lovelace*"]),
        EntityDefinition::new("log files", OpaqueState, "Runtime logs")
            .with_paths(["*.log", "*.log.[0-9]*", "*.log.fault"]),
    ]
}
