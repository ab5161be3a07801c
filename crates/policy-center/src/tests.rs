use crate::api::PolicyCenter;
use crate::defaults::default_snapshot;
use crate::loader::{load_snapshot_with_options, parse_policy_str, LoadOptions};
use crate::model::PolicySource;
use std::env;
use std::sync::{Mutex, OnceLock};
use supplychain_core_types::Role;

#[test]
fn default_snapshot_grants_known_roles_only() {
    let snapshot = default_snapshot();
    assert!(snapshot.access.keywords(Role::Finance).any(|k| k == "sales"));
    assert_eq!(snapshot.access.keywords(Role::Unrecognized).count(), 0);
    assert_eq!(snapshot.geo.len(), 2);
    assert_eq!(snapshot.source, PolicySource::Builtin);
}

#[test]
fn load_snapshot_overlays_file_entries() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(
        &file_path,
        r#"roles:
  Finance: [Finance, PNL, costs]
  auditor: [sales]
geo:
  South Asia: India
"#,
    )
    .unwrap();

    let snapshot = load_snapshot_with_options(&LoadOptions {
        paths: vec![file_path.clone()],
        include_env: true,
    })
    .unwrap();
    let finance: Vec<&str> = snapshot.access.keywords(Role::Finance).collect();
    assert_eq!(finance, vec!["costs", "finance", "pnl"]);
    // untouched roles keep their builtin keywords
    assert!(snapshot.access.keywords(Role::Planning).count() > 0);
    assert!(snapshot
        .geo
        .restrictions()
        .any(|(phrase, region)| phrase == "South Asia" && region == "India"));
    assert!(snapshot.geo.restrictions().any(|(phrase, _)| phrase == "Southwest"));
    assert_eq!(snapshot.source, PolicySource::File);
}

#[test]
fn document_without_inheritance_starts_empty() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.json");
    std::fs::write(
        &file_path,
        r#"{"inherit_defaults": false, "roles": {"planner": ["inventory"]}}"#,
    )
    .unwrap();

    let snapshot = load_snapshot_with_options(&LoadOptions {
        paths: vec![file_path],
        include_env: false,
    })
    .unwrap();
    assert_eq!(snapshot.access.keywords(Role::Finance).count(), 0);
    assert_eq!(
        snapshot.access.keywords(Role::Planning).collect::<Vec<_>>(),
        vec!["inventory"]
    );
    assert!(snapshot.geo.is_empty());
}

#[test]
fn rejects_empty_keywords_and_regions() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bad_keyword = dir.path().join("keyword.yaml");
    std::fs::write(&bad_keyword, "roles:\n  finance: ['  ']\n").unwrap();
    assert!(load_snapshot_with_options(&LoadOptions {
        paths: vec![bad_keyword],
        include_env: false,
    })
    .is_err());

    let bad_region = dir.path().join("region.yaml");
    std::fs::write(&bad_region, "geo:\n  Oceania: ''\n").unwrap();
    assert!(load_snapshot_with_options(&LoadOptions {
        paths: vec![bad_region],
        include_env: false,
    })
    .is_err());
}

#[test]
fn env_json_overlay_records_source() {
    let _guard = env_guard().lock().unwrap();
    env::set_var(
        "SCA_POLICY_OVERRIDE_JSON",
        r#"{"geo": {"Southwest": "India"}}"#,
    );
    let snapshot = load_snapshot_with_options(&LoadOptions {
        include_env: true,
        ..LoadOptions::default()
    })
    .expect("load snapshot");
    env::remove_var("SCA_POLICY_OVERRIDE_JSON");
    assert!(snapshot
        .geo
        .restrictions()
        .any(|(phrase, region)| phrase == "Southwest" && region == "India"));
    assert_eq!(snapshot.source, PolicySource::Env);
}

#[test]
fn parse_policy_reports_both_formats() {
    let err = parse_policy_str("roles: [unterminated").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("json error"));
    assert!(message.contains("yaml error"));
}

#[test]
fn swap_replaces_whole_snapshot_and_bumps_revision() {
    let center = PolicyCenter::new(default_snapshot());
    let before = center.snapshot();
    assert_eq!(before.rev, 1);

    let mut next = default_snapshot();
    next.access.grant(Role::Finance, ["pnl"]);
    let installed = center.swap(next);

    assert_eq!(installed.rev, 2);
    assert_eq!(center.revision(), 2);
    // readers holding the old snapshot keep a consistent view
    assert!(before.access.keywords(Role::Finance).any(|k| k == "sales"));
    assert_eq!(
        center
            .snapshot()
            .access
            .keywords(Role::Finance)
            .collect::<Vec<_>>(),
        vec!["pnl"]
    );
}

#[test]
fn reload_picks_up_edited_file_and_keeps_old_on_error() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(&file_path, "geo:\n  Oceania: Pacific Asia\n").unwrap();
    let options = LoadOptions {
        paths: vec![file_path.clone()],
        include_env: false,
    };
    let center = PolicyCenter::new(load_snapshot_with_options(&options).unwrap());
    assert_eq!(center.revision(), 1);

    std::fs::write(&file_path, "roles:\n  finance: [pnl]\n").unwrap();
    let installed = center.reload(&options).unwrap();
    assert_eq!(installed.rev, 2);
    assert_eq!(installed.access.keywords(Role::Finance).collect::<Vec<_>>(), vec!["pnl"]);

    std::fs::write(&file_path, "roles:\n  finance: ['']\n").unwrap();
    assert!(center.reload(&options).is_err());
    assert_eq!(center.revision(), 2);
}

fn env_guard() -> &'static Mutex<()> {
    static ENV_GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_GUARD.get_or_init(|| Mutex::new(()))
}
