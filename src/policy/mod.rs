//! Ownership policy for listing mutations.
//!
//! The role gate lives in the `BrokerUser` extractor; this module decides
//! whether a broker may touch a specific listing.

use crate::domain::{PropertyAggregate, StringUuid};
use crate::error::{AppError, Result};

/// Existence is checked before ownership: a missing listing is NotFound even
/// for callers who could never own it.
pub fn ensure_owner(
    existing: Option<PropertyAggregate>,
    caller: StringUuid,
) -> Result<PropertyAggregate> {
    let aggregate =
        existing.ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    if aggregate.property.broker_id != caller {
        return Err(AppError::Forbidden(
            "You can only modify your own properties".to_string(),
        ));
    }
    Ok(aggregate)
}
