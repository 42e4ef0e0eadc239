//! Zone listing endpoints, all gated by the caller's visibility filter.
use axum::{Extension, Json, extract::Query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::SharedState;
use crate::auth::Authenticated;
use crate::db::zone_repo::{self, Zone, ZoneQuery};
use crate::error::AppError;

#[derive(Serialize)]
pub struct ZoneDto {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Zone> for ZoneDto {
    fn from(zone: Zone) -> Self {
        ZoneDto {
            id: zone.id,
            name: zone.name,
            kind: zone.kind.as_db().to_string(),
            created_at: zone.created_at,
            updated_at: zone.updated_at,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct ZoneListParams {
    pub search: Option<String>,
    pub letter: Option<String>,
}

impl ZoneListParams {
    fn into_query(self) -> Result<ZoneQuery, AppError> {
        if let Some(letter) = &self.letter {
            if letter.chars().count() != 1 {
                return Err(AppError::bad_request("letter must be a single character"));
            }
        }
        Ok(ZoneQuery {
            search: self.search.filter(|s| !s.is_empty()),
            letter: self.letter,
        })
    }
}

// GET /api/zones
pub async fn list_zones(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Query(params): Query<ZoneListParams>,
) -> Result<Json<ApiResponse<Vec<ZoneDto>>>, AppError> {
    let filter = principal.visibility();
    let query = params.into_query()?;

    let zones = zone_repo::list(&state.db, &filter, &query).await?;
    let dtos: Vec<ZoneDto> = zones.into_iter().map(ZoneDto::from).collect();

    Ok(Json(ApiResponse::ok("zones listed", dtos)))
}

#[derive(Serialize)]
pub struct ZoneCountDto {
    pub count: i64,
}

// GET /api/zones/count
pub async fn count_zones(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Query(params): Query<ZoneListParams>,
) -> Result<Json<ApiResponse<ZoneCountDto>>, AppError> {
    let filter = principal.visibility();
    let query = params.into_query()?;

    let count = zone_repo::count(&state.db, &filter, &query).await?;

    Ok(Json(ApiResponse::ok("zones counted", ZoneCountDto { count })))
}

// GET /api/zones/letters
pub async fn zone_letters(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let filter = principal.visibility();
    let letters = zone_repo::first_letters(&state.db, &filter).await?;

    Ok(Json(ApiResponse::ok("letter index", letters)))
}
