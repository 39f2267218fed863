//! Entity Classification Value Object
//!
//! Says whether a host-side concern can be restored by redeploying the tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a host-side concern relates to the configuration tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityClassification {
    /// Fully represented in the tree; a redeploy restores it.
    Managed,
    /// Needs a one-time manual action on the host before automation works.
    BootstrapState,
    /// Runtime-only state; never restorable from the tree.
    OpaqueState,
}

impl EntityClassification {
    pub const ALL: [EntityClassification; 3] = [
        EntityClassification::Managed,
        EntityClassification::BootstrapState,
        EntityClassification::OpaqueState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClassification::Managed => "managed",
            EntityClassification::BootstrapState => "bootstrap-state",
            EntityClassification::OpaqueState => "opaque-state",
        }
    }

    /// Whether a full redeploy brings this concern back without operator action
    pub fn restored_by_redeploy(&self) -> bool {
        matches!(self, EntityClassification::Managed)
    }
}

impl fmt::Display for EntityClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "managed" => Ok(EntityClassification::Managed),
            "bootstrap" | "bootstrap-state" | "bootstrap_state" => {
                Ok(EntityClassification::BootstrapState)
            }
            "opaque" | "opaque-state" | "opaque_state" => Ok(EntityClassification::OpaqueState),
            other => Err(format!(
                "unknown classification '{}' (expected managed, bootstrap or opaque)",
                other
            )),
        }
    }
}
