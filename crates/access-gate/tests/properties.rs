use access_gate::chain::enforce_with;
use access_gate::{enforce_geo, enforce_rbac, AccessDenied};
use proptest::prelude::*;
use supplychain_core_types::{CandidateQuery, Intent, Role};
use supplychain_policy_center::{AccessPolicy, GeoPolicy, PolicySnapshot, PolicySource};

const FRAGMENTS: &[&str] = &[
    "SELECT SUM(Sales) AS total_sales FROM inventory",
    "`Order Region` = 'Southwest'",
    "`Order Region` = 'Western Europe'",
    "`Customer Id`, `Customer Fname`",
    "`Shipping Mode`",
    "`Delivery Status` = 'On Time'",
    "`Days for shipping (real)` >= 180",
    "`Product Category`",
    "GROUP BY `Order Country`",
    "LIMIT 10",
];

const KEYWORDS: &[&str] = &[
    "sales",
    "profit",
    "customer",
    "shipping mode",
    "delivery status",
    "days for shipping",
    "product category",
];

const REGIONS: &[&str] = &["India", "North America", "Europe", "", "north america"];

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Finance),
        Just(Role::Planning),
        Just(Role::OperationsManager),
        Just(Role::Unrecognized),
    ]
}

fn query_strategy() -> impl Strategy<Value = String> {
    proptest::sample::subsequence(FRAGMENTS.to_vec(), 0..=FRAGMENTS.len())
        .prop_map(|parts| parts.join(" "))
}

fn access_strategy() -> impl Strategy<Value = AccessPolicy> {
    proptest::collection::vec(
        (
            role_strategy(),
            proptest::sample::subsequence(KEYWORDS.to_vec(), 0..=3),
        ),
        0..4,
    )
    .prop_map(|entries| {
        let mut policy = AccessPolicy::new();
        for (role, keywords) in entries {
            policy.grant(role, keywords);
        }
        policy
    })
}

fn geo_strategy() -> impl Strategy<Value = GeoPolicy> {
    proptest::collection::vec(
        (
            prop_oneof![Just("Southwest"), Just("Western Europe"), Just("Oceania")],
            proptest::sample::select(REGIONS.to_vec()).prop_filter("non-empty", |r| !r.is_empty()),
        ),
        0..3,
    )
    .prop_map(|entries| {
        let mut policy = GeoPolicy::new();
        for (phrase, region) in entries {
            policy.restrict(phrase, region);
        }
        policy
    })
}

fn candidate(sql: &str) -> CandidateQuery {
    CandidateQuery::new(sql, Intent::SalesAggregation)
}

proptest! {
    #[test]
    fn rbac_allows_iff_some_granted_keyword_is_present(
        sql in query_strategy(),
        role in role_strategy(),
        access in access_strategy(),
    ) {
        let lowered = sql.to_lowercase();
        let expected = role != Role::Unrecognized
            && access.keywords(role).any(|keyword| lowered.contains(keyword));
        let outcome = enforce_rbac(candidate(&sql), role, &access);
        prop_assert_eq!(outcome.is_ok(), expected);
        match outcome {
            Ok(query) => {
                prop_assert_eq!(query.sql, sql);
            }
            Err(denied) => {
                prop_assert_eq!(denied, AccessDenied::role());
            }
        }
    }

    #[test]
    fn geo_denies_iff_present_phrase_requires_other_region(
        sql in query_strategy(),
        region in proptest::sample::select(REGIONS.to_vec()),
        geo in geo_strategy(),
    ) {
        let lowered = sql.to_lowercase();
        let expected_denied = geo
            .restrictions()
            .any(|(phrase, required)| lowered.contains(&phrase.to_lowercase()) && required != region);
        let outcome = enforce_geo(candidate(&sql), region, &geo);
        prop_assert_eq!(outcome.is_err(), expected_denied);
    }

    #[test]
    fn chain_outcome_is_order_independent(
        sql in query_strategy(),
        role in role_strategy(),
        region in proptest::sample::select(REGIONS.to_vec()),
        access in access_strategy(),
        geo in geo_strategy(),
    ) {
        let snapshot = PolicySnapshot { rev: 1, access, geo, source: PolicySource::Builtin };
        let geo_first = enforce_with(&snapshot, candidate(&sql), role, region).is_ok();
        let role_first = enforce_rbac(candidate(&sql), role, &snapshot.access)
            .and_then(|query| enforce_geo(query, region, &snapshot.geo))
            .is_ok();
        prop_assert_eq!(geo_first, role_first);
    }
}
