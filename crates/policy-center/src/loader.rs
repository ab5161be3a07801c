use std::env;
use std::fs;
use std::path::PathBuf;

use supplychain_core_types::Role;
use tracing::{info, warn};

use crate::defaults::default_snapshot;
use crate::errors::PolicyError;
use crate::model::{AccessPolicy, GeoPolicy, PolicyDocument, PolicySnapshot, PolicySource};

const ENV_PATH: &str = "SCA_POLICY_PATH";
const ENV_JSON: &str = "SCA_POLICY_OVERRIDE_JSON";

#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
}

/// Builtin defaults, then each existing file in order, then the
/// `SCA_POLICY_PATH` file and `SCA_POLICY_OVERRIDE_JSON` overlay.
pub fn load_snapshot_with_options(options: &LoadOptions) -> Result<PolicySnapshot, PolicyError> {
    let mut snapshot = default_snapshot();

    let mut paths = options.paths.clone();
    if options.include_env {
        if let Some(path) = env::var_os(ENV_PATH) {
            paths.push(PathBuf::from(path));
        }
    }

    for path in &paths {
        if !path.exists() {
            warn!(path = %path.display(), "policy file not found; skipping");
            continue;
        }
        let content =
            fs::read_to_string(path).map_err(|err| PolicyError::Io(format!("{}", err)))?;
        let document = parse_policy_str(&content)?;
        apply_document(&mut snapshot, document, PolicySource::File)?;
        info!(path = %path.display(), "applied policy file");
    }

    if options.include_env {
        if let Ok(raw_json) = env::var(ENV_JSON) {
            if !raw_json.trim().is_empty() {
                let document: PolicyDocument = serde_json::from_str(&raw_json)
                    .map_err(|err| PolicyError::Deserialize(format!("{}", err)))?;
                apply_document(&mut snapshot, document, PolicySource::Env)?;
            }
        }
    }

    validate(&snapshot)?;
    Ok(snapshot)
}

/// Accepts JSON first, YAML second.
pub fn parse_policy_str(raw: &str) -> Result<PolicyDocument, PolicyError> {
    match serde_json::from_str(raw) {
        Ok(document) => Ok(document),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            PolicyError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

pub(crate) fn apply_document(
    snapshot: &mut PolicySnapshot,
    document: PolicyDocument,
    source: PolicySource,
) -> Result<(), PolicyError> {
    if !document.inherit_defaults {
        snapshot.access = AccessPolicy::new();
        snapshot.geo = GeoPolicy::new();
    }

    for (label, keywords) in document.roles {
        let role = Role::parse(&label);
        if role == Role::Unrecognized {
            warn!(role = %label, "policy names an unknown role; entry ignored");
            continue;
        }
        if keywords.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(PolicyError::Invalid(format!(
                "role '{label}' lists an empty keyword"
            )));
        }
        snapshot.access.grant(role, keywords);
    }

    for (phrase, region) in document.geo {
        snapshot.geo.restrict(phrase, region);
    }

    snapshot.source = source;
    Ok(())
}

fn validate(snapshot: &PolicySnapshot) -> Result<(), PolicyError> {
    for (phrase, region) in snapshot.geo.restrictions() {
        if phrase.is_empty() {
            return Err(PolicyError::Invalid("geo restriction with empty phrase".into()));
        }
        if region.is_empty() {
            return Err(PolicyError::Invalid(format!(
                "geo restriction '{phrase}' has no required region"
            )));
        }
    }
    for (role, keywords) in snapshot.access.roles() {
        if keywords.is_empty() {
            warn!(%role, "role has an empty keyword set; every query will be denied");
        }
    }
    Ok(())
}
