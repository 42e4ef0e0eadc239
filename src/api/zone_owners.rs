//! CRUD over explicit user-to-zone ownership assignments.
use axum::{Extension, Json, extract::Path, http::StatusCode};
use serde::Deserialize;
use tracing::info;

use super::{ApiResponse, accessible_zone};
use crate::SharedState;
use crate::auth::Authenticated;
use crate::db::ownership_repo::{self, BatchAddOutcome, ZoneOwner};
use crate::db::user_repo;
use crate::error::AppError;

// GET /api/zones/{zone_id}/owners
pub async fn list_owners(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ZoneOwner>>>, AppError> {
    accessible_zone(&state, &principal, zone_id).await?;

    let owners = ownership_repo::list_owners(&state.db, zone_id).await?;
    Ok(Json(ApiResponse::ok("owners listed", owners)))
}

#[derive(Deserialize)]
pub struct AddOwnerRequest {
    pub user_id: i64,
}

// POST /api/zones/{zone_id}/owners
pub async fn add_owner(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
    Json(req): Json<AddOwnerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ZoneOwner>>), AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    if !user_repo::exists(&state.db, req.user_id).await? {
        return Err(AppError::NotFound);
    }
    if !ownership_repo::add_owner(&state.db, zone_id, req.user_id).await? {
        return Err(AppError::conflict("user already owns this zone"));
    }

    info!("user {} added as owner of zone {}", req.user_id, zone.name);

    let owner = ownership_repo::list_owners(&state.db, zone_id)
        .await?
        .into_iter()
        .find(|o| o.user_id == req.user_id)
        .ok_or(AppError::NotFound)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("owner added", owner)),
    ))
}

#[derive(Deserialize)]
pub struct AddOwnersBatchRequest {
    pub user_ids: Vec<i64>,
}

// POST /api/zones/{zone_id}/owners/batch
pub async fn add_owners_batch(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
    Json(req): Json<AddOwnersBatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BatchAddOutcome>>), AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    let outcome = ownership_repo::add_owners(&state.db, zone_id, &req.user_ids).await?;
    info!(
        "batch owner add on zone {}: {} added, {} skipped, {} unknown",
        zone.name,
        outcome.added.len(),
        outcome.skipped.len(),
        outcome.not_found.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("batch processed", outcome)),
    ))
}

// DELETE /api/zones/{zone_id}/owners/{user_id}
pub async fn remove_owner(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path((zone_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    if !ownership_repo::remove_owner(&state.db, zone_id, user_id).await? {
        return Err(AppError::NotFound);
    }

    info!("user {} removed as owner of zone {}", user_id, zone.name);
    Ok(Json(ApiResponse::ok("owner removed", ())))
}
