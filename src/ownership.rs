//! Effective zone ownership resolution.
//!
//! A principal owns a zone when a direct ownership row exists or when any
//! group assigned to the zone counts the principal as a member. Groups are
//! flat; membership is never inherited through another group. The membership
//! set is the one loaded at authentication, so one request sees one
//! consistent view of it. The elevated `all` scope is deliberately not
//! consulted here: bypassing ownership is the caller's decision (see `api`),
//! keeping this check meaningful on its own.

use crate::auth::Principal;
use crate::db::ownership_repo;
use sqlx::SqlitePool;

/// Decide whether the principal is an effective owner of the zone.
pub async fn is_owner(db: &SqlitePool, principal: &Principal, zone_id: i64) -> sqlx::Result<bool> {
    if ownership_repo::direct_owner_exists(db, zone_id, principal.id).await? {
        return Ok(true);
    }

    if principal.groups.is_empty() {
        return Ok(false);
    }

    let zone_groups = ownership_repo::group_owners_of(db, zone_id).await?;
    Ok(zone_groups.iter().any(|g| principal.groups.contains(g)))
}
