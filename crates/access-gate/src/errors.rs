use supplychain_core_types::{DenialKind, DispatchError};
use thiserror::Error;

/// Raised by either filter. The message never names the phrase or keyword
/// that caused the denial.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("access denied by {} filter", kind_label(.kind))]
pub struct AccessDenied {
    pub kind: DenialKind,
}

impl AccessDenied {
    pub fn geo() -> Self {
        Self {
            kind: DenialKind::Geo,
        }
    }

    pub fn role() -> Self {
        Self {
            kind: DenialKind::Role,
        }
    }
}

impl From<AccessDenied> for DispatchError {
    fn from(value: AccessDenied) -> Self {
        DispatchError::AccessDenied(value.kind)
    }
}

fn kind_label(kind: &DenialKind) -> &'static str {
    match kind {
        DenialKind::Geo => "geo-fence",
        DenialKind::Role => "role",
    }
}
