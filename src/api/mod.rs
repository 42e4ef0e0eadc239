pub mod records;
pub mod zone_owners;
pub mod zones;

use axum::{
    Extension, Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::SharedState;
use crate::auth::Principal;
use crate::db::zone_repo::{self, Zone};
use crate::error::AppError;
use crate::ownership;

/// Success envelope returned by every endpoint: success flag, human-readable
/// message, typed payload.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(msg: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            msg: msg.into(),
            data,
        }
    }
}

/// Load a zone the principal may act on. Elevated scope bypasses the
/// ownership check entirely; everyone else must be an effective owner.
pub(crate) async fn accessible_zone(
    state: &SharedState,
    principal: &Principal,
    zone_id: i64,
) -> Result<Zone, AppError> {
    let zone = zone_repo::find(&state.db, zone_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !principal.is_elevated() && !ownership::is_owner(&state.db, principal, zone_id).await? {
        return Err(AppError::Forbidden);
    }

    Ok(zone)
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/zones", get(zones::list_zones))
        .route("/api/zones/count", get(zones::count_zones))
        .route("/api/zones/letters", get(zones::zone_letters))
        .route(
            "/api/zones/{zone_id}/records",
            get(records::list_records).post(records::create_record),
        )
        .route(
            "/api/zones/{zone_id}/records/{record_id}",
            axum::routing::put(records::update_record).delete(records::delete_record),
        )
        .route(
            "/api/zones/{zone_id}/owners",
            get(zone_owners::list_owners).post(zone_owners::add_owner),
        )
        .route(
            "/api/zones/{zone_id}/owners/batch",
            post(zone_owners::add_owners_batch),
        )
        .route(
            "/api/zones/{zone_id}/owners/{user_id}",
            delete(zone_owners::remove_owner),
        )
        .layer(Extension(state))
}
