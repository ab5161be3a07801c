use supplychain_core_types::{CandidateQuery, Role};
use supplychain_policy_center::{AccessPolicy, GeoPolicy};

use crate::errors::AccessDenied;

/// Deny when the query mentions a restricted phrase whose required region is
/// not `region`. Phrase matching ignores case; region comparison is exact.
pub fn enforce_geo(
    query: CandidateQuery,
    region: &str,
    policy: &GeoPolicy,
) -> Result<CandidateQuery, AccessDenied> {
    let haystack = query.sql().to_lowercase();
    let violated = policy.restrictions().any(|(phrase, required)| {
        haystack.contains(&phrase.to_lowercase()) && required != region
    });
    if violated {
        return Err(AccessDenied::geo());
    }
    Ok(query)
}

/// Allow only when at least one keyword granted to `role` appears in the
/// query. A role with no keywords never passes.
pub fn enforce_rbac(
    query: CandidateQuery,
    role: Role,
    policy: &AccessPolicy,
) -> Result<CandidateQuery, AccessDenied> {
    let haystack = query.sql().to_lowercase();
    let mut keywords = policy.keywords(role);
    if keywords.any(|keyword| !keyword.is_empty() && haystack.contains(keyword)) {
        Ok(query)
    } else {
        Err(AccessDenied::role())
    }
}
