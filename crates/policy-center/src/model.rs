use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use supplychain_core_types::Role;

/// Immutable view of both access tables at one revision.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PolicySnapshot {
    pub rev: u64,
    pub access: AccessPolicy,
    pub geo: GeoPolicy,
    pub source: PolicySource,
}

/// Role → permitted domain keywords. Keywords are stored lower-cased.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessPolicy {
    roles: BTreeMap<Role, BTreeSet<String>>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keyword set of `role`. `Unrecognized` can never be granted
    /// anything, so it is ignored.
    pub fn grant<I, S>(&mut self, role: Role, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if role == Role::Unrecognized {
            return;
        }
        let set = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_ascii_lowercase())
            .collect();
        self.roles.insert(role, set);
    }

    /// Permitted keywords for `role`; empty when the role is absent.
    pub fn keywords(&self, role: Role) -> impl Iterator<Item = &str> {
        let set = if role == Role::Unrecognized {
            None
        } else {
            self.roles.get(&role)
        };
        set.into_iter().flatten().map(String::as_str)
    }

    pub fn roles(&self) -> impl Iterator<Item = (&Role, &BTreeSet<String>)> {
        self.roles.iter()
    }
}

/// Restricted phrase → the only region allowed to see it.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct GeoPolicy {
    restrictions: BTreeMap<String, String>,
}

impl GeoPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restrict(&mut self, phrase: impl Into<String>, region: impl Into<String>) {
        self.restrictions
            .insert(phrase.into().trim().to_string(), region.into().trim().to_string());
    }

    pub fn restrictions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.restrictions
            .iter()
            .map(|(phrase, region)| (phrase.as_str(), region.as_str()))
    }

    pub fn len(&self) -> usize {
        self.restrictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PolicySource {
    #[default]
    Builtin,
    File,
    Env,
}

/// On-disk policy overlay. Sections present in the document replace the
/// matching role or phrase entries of the base snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default = "default_inherit")]
    pub inherit_defaults: bool,
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub geo: BTreeMap<String, String>,
}

fn default_inherit() -> bool {
    true
}
