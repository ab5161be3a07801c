use std::sync::Arc;

use supplychain_core_types::{CandidateQuery, Role};
use supplychain_policy_center::{PolicyCenter, PolicySnapshot};
use tracing::{debug, warn};

use crate::errors::AccessDenied;
use crate::filters::{enforce_geo, enforce_rbac};

/// Runs both filters against a single policy snapshot.
#[derive(Clone)]
pub struct AccessGate {
    policies: Arc<PolicyCenter>,
}

impl AccessGate {
    pub fn new(policies: Arc<PolicyCenter>) -> Self {
        Self { policies }
    }

    pub fn enforce(
        &self,
        query: CandidateQuery,
        role: Role,
        region: &str,
    ) -> Result<CandidateQuery, AccessDenied> {
        let snapshot = self.policies.snapshot();
        let outcome = enforce_with(&snapshot, query, role, region);
        match &outcome {
            Ok(query) => debug!(
                intent = %query.intent,
                %role,
                policy_rev = snapshot.rev,
                "query cleared access chain"
            ),
            Err(denied) => warn!(
                kind = ?denied.kind,
                %role,
                policy_rev = snapshot.rev,
                "query rejected by access chain"
            ),
        }
        outcome
    }
}

/// Geo-fence then role filter.
pub fn enforce_with(
    snapshot: &PolicySnapshot,
    query: CandidateQuery,
    role: Role,
    region: &str,
) -> Result<CandidateQuery, AccessDenied> {
    let query = enforce_geo(query, region, &snapshot.geo)?;
    enforce_rbac(query, role, &snapshot.access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplychain_core_types::Intent;
    use supplychain_policy_center::default_snapshot;

    #[test]
    fn gate_reports_geo_before_role() {
        let gate = AccessGate::new(Arc::new(PolicyCenter::new(default_snapshot())));
        let query = CandidateQuery::new(
            "SELECT SUM(Sales) FROM inventory WHERE `Order Region` = 'Southwest'",
            Intent::SalesAggregation,
        );
        let err = gate.enforce(query, Role::Unrecognized, "India").unwrap_err();
        assert_eq!(err, AccessDenied::geo());
    }

    #[test]
    fn gate_sees_swapped_policy() {
        let center = Arc::new(PolicyCenter::new(default_snapshot()));
        let gate = AccessGate::new(Arc::clone(&center));
        let query = CandidateQuery::new(
            "SELECT `Shipping Mode` FROM inventory",
            Intent::DeliveryPerformance,
        );
        assert!(gate.enforce(query.clone(), Role::Finance, "India").is_err());

        let mut next = default_snapshot();
        next.access.grant(Role::Finance, ["shipping mode"]);
        center.swap(next);
        assert!(gate.enforce(query, Role::Finance, "India").is_ok());
    }
}
