//! Organization resolution for declared entries.
//!
//! # Invariants
//! - `org_id == 0` with a non-empty `org_name` is resolved by name lookup.
//! - A negative `org_id` always becomes `DEFAULT_ORG_ID`.
//! - Anything else (including `0` with an empty name) is passed through.

use crate::model::notification::{OrgId, OrgScoped, DEFAULT_ORG_ID};
use crate::service::provisioner::{ProvisionError, ProvisionResult};
use crate::store::NotificationStore;

/// Returns the concrete organization id an entry targets.
///
/// # Errors
/// - `ProvisionError::OrganizationNotFound` when the named org does not exist.
/// - `ProvisionError::Store` when the lookup itself fails.
pub fn resolve_org_id<S, E>(store: &S, entry: &E) -> ProvisionResult<OrgId>
where
    S: NotificationStore + ?Sized,
    E: OrgScoped + ?Sized,
{
    let org_id = entry.org_id();
    let org_name = entry.org_name();

    if org_id == 0 && !org_name.is_empty() {
        return store
            .find_org_by_name(org_name)?
            .map(|org| org.id)
            .ok_or_else(|| ProvisionError::OrganizationNotFound(org_name.to_string()));
    }

    if org_id < 0 {
        return Ok(DEFAULT_ORG_ID);
    }

    Ok(org_id)
}
