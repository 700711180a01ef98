//! Acceptance rules applied to a fully extracted record.

use std::sync::LazyLock;

use mcscout_core::{CarrierRecord, EntityType};
use regex::Regex;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}").expect("valid date regex"));

/// Why an extracted record was filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingLegalName,
    EntityTypeMismatch {
        wanted: EntityType,
        found: String,
    },
    OutOfService {
        date: String,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingLegalName => f.write_str("no legal name"),
            RejectReason::EntityTypeMismatch { wanted, found } => {
                write!(f, "entity type \"{found}\" is not {wanted}")
            }
            RejectReason::OutOfService { date } => write!(f, "out of service since {date}"),
        }
    }
}

/// Checks `record` against the scan's filters, in order.
///
/// An empty entity type passes (the page may simply not print one), and an
/// out-of-service value only rejects when it looks like a date, so
/// placeholders such as `N/A` or `None` pass. Status and authority are
/// recorded but not filtered on.
///
/// # Errors
///
/// Returns the first failing [`RejectReason`].
pub fn is_acceptable(record: &CarrierRecord, wanted: EntityType) -> Result<(), RejectReason> {
    if record.legal_name.trim().is_empty() {
        return Err(RejectReason::MissingLegalName);
    }

    let entity = record.entity_type.trim();
    if !entity.is_empty() && !entity.to_lowercase().contains(wanted.keyword()) {
        return Err(RejectReason::EntityTypeMismatch {
            wanted,
            found: entity.to_owned(),
        });
    }

    let oos = record.out_of_service_date.trim();
    if !oos.is_empty() && DATE_RE.is_match(oos) {
        return Err(RejectReason::OutOfService {
            date: oos.to_owned(),
        });
    }

    Ok(())
}
