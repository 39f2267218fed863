//! HostManifest entity - what the host currently holds
//!
//! A pure data structure listing host-side paths (relative to the host's
//! configuration directory) and their content fingerprints. Transports
//! produce it; the planner compares it against a `ConfigTree`.

use std::collections::BTreeMap;

use crate::domain::value_objects::Fingerprint;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostManifest {
    entries: BTreeMap<String, Fingerprint>,
}

impl HostManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, fingerprint: Fingerprint) {
        self.entries.insert(path.into(), fingerprint);
    }

    pub fn remove(&mut self, path: &str) -> Option<Fingerprint> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&Fingerprint> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(p, f)| (p.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Fingerprint)> for HostManifest {
    fn from_iter<T: IntoIterator<Item = (String, Fingerprint)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
