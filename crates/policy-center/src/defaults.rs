use supplychain_core_types::Role;

use crate::model::{AccessPolicy, GeoPolicy, PolicySnapshot, PolicySource};

/// Built-in rule set. Keywords are column-level domain markers of the
/// `inventory` table rather than the table name itself, so each role only
/// clears the queries that touch its own domain.
pub fn default_snapshot() -> PolicySnapshot {
    let mut access = AccessPolicy::new();
    access.grant(Role::Finance, ["sales", "profit", "customer"]);
    access.grant(
        Role::Planning,
        [
            "days for shipping",
            "product category",
            "customer segment",
            "shipping date",
        ],
    );
    access.grant(
        Role::OperationsManager,
        [
            "shipping mode",
            "delivery status",
            "days for shipping",
            "shipping date",
        ],
    );

    let mut geo = GeoPolicy::new();
    geo.restrict("Southwest", "North America");
    geo.restrict("Western Europe", "Europe");

    PolicySnapshot {
        rev: 1,
        access,
        geo,
        source: PolicySource::Builtin,
    }
}
