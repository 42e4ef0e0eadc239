//! Record endpoints: listing with comment merge and fragment display, plus
//! add/edit/delete with RRset sync into PowerDNS.
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiResponse, accessible_zone};
use crate::SharedState;
use crate::auth::Authenticated;
use crate::comments;
use crate::db::comment_repo;
use crate::db::record_repo::{self, Record};
use crate::db::zone_repo::Zone;
use crate::error::AppError;
use crate::powerdns::types::PdnsRecord;
use crate::record_name;

#[derive(Serialize)]
pub struct RecordDto {
    pub id: i64,
    pub zone_id: i64,
    /// Canonical stored name, zone suffix included.
    pub name: String,
    /// The fragment originally entered by the user, for the edit form.
    pub fragment: String,
    pub rtype: String,
    pub content: String,
    pub ttl: i64,
    pub prio: Option<i64>,
    pub disabled: bool,
    pub comment: Option<String>,
}

impl RecordDto {
    fn new(zone: &Zone, record: Record, comment: Option<String>) -> Self {
        let fragment = record_name::display_fragment(&zone.name, &record.name);
        RecordDto {
            id: record.id,
            zone_id: record.zone_id,
            name: record.name,
            fragment,
            rtype: record.rtype,
            content: record.content,
            ttl: record.ttl,
            prio: record.prio,
            disabled: record.disabled,
            comment,
        }
    }
}

// GET /api/zones/{zone_id}/records
pub async fn list_records(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<RecordDto>>>, AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    let records = record_repo::list_for_zone(&state.db, zone_id).await?;
    let mut dtos = Vec::with_capacity(records.len());
    for record in records {
        let comment = comments::resolve_comment(
            &state.db,
            record.id,
            zone_id,
            &record.name,
            &record.rtype,
        )
        .await?;
        dtos.push(RecordDto::new(&zone, record, comment));
    }

    Ok(Json(ApiResponse::ok("records listed", dtos)))
}

#[derive(Deserialize)]
pub struct RecordRequest {
    /// Name fragment as entered; `@` or empty means the zone apex.
    #[serde(default)]
    pub name: String,
    pub rtype: String,
    pub content: String,
    pub ttl: Option<u32>,
    pub prio: Option<i64>,
    #[serde(default)]
    pub disabled: bool,
    pub comment: Option<String>,
}

/// Push the current state of one RRset to PowerDNS. A failed push leaves the
/// database as the source of truth and is surfaced as a warning only.
async fn sync_rrset(state: &SharedState, zone: &Zone, name: &str, rtype: &str) {
    let records = match record_repo::list_rrset(&state.db, zone.id, name, rtype).await {
        Ok(records) => records,
        Err(err) => {
            warn!("rrset read for sync failed: {err}");
            return;
        }
    };

    let fqdn = format!("{}.", name);
    let zone_fqdn = format!("{}.", zone.name);

    let result = if records.is_empty() {
        state.pdns.delete_rrset(&zone_fqdn, &fqdn, rtype).await
    } else {
        let ttl = records.iter().map(|r| r.ttl).min().unwrap_or(3600) as u32;
        let contents = records
            .into_iter()
            .map(|r| PdnsRecord {
                content: r.content,
                disabled: r.disabled,
            })
            .collect();
        state
            .pdns
            .replace_rrset(&zone_fqdn, &fqdn, rtype, ttl, contents)
            .await
    };

    if let Err(err) = result {
        warn!("PowerDNS sync for {fqdn}/{rtype} failed: {err}");
    }
}

// POST /api/zones/{zone_id}/records
pub async fn create_record(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
    Json(req): Json<RecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecordDto>>), AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    let name = record_name::compose(&zone.name, zone.kind, &req.name, &req.rtype)?;
    let ttl = state.config.effective_ttl(req.ttl) as i64;

    let record_id = record_repo::insert(
        &state.db,
        zone_id,
        &name,
        &req.rtype,
        &req.content,
        ttl,
        req.prio,
        req.disabled,
    )
    .await?;

    if let Some(comment) = req.comment.as_deref().filter(|c| !c.is_empty()) {
        comment_repo::set_record_comment(
            &state.db,
            record_id,
            zone_id,
            &name,
            &req.rtype,
            comment,
            &principal.username,
        )
        .await?;
    }

    sync_rrset(&state, &zone, &name, &req.rtype).await;
    info!("record {name}/{} created in zone {}", req.rtype, zone.name);

    let record = record_repo::find(&state.db, record_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let comment = comments::resolve_comment(&state.db, record_id, zone_id, &name, &req.rtype).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "record created",
            RecordDto::new(&zone, record, comment),
        )),
    ))
}

// PUT /api/zones/{zone_id}/records/{record_id}
pub async fn update_record(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path((zone_id, record_id)): Path<(i64, i64)>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<ApiResponse<RecordDto>>, AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    let existing = record_repo::find(&state.db, record_id)
        .await?
        .filter(|r| r.zone_id == zone_id)
        .ok_or(AppError::NotFound)?;

    let name = record_name::compose(&zone.name, zone.kind, &req.name, &req.rtype)?;
    let ttl = state.config.effective_ttl(req.ttl) as i64;

    record_repo::update(
        &state.db,
        record_id,
        &name,
        &req.rtype,
        &req.content,
        ttl,
        req.prio,
        req.disabled,
    )
    .await?;

    match req.comment.as_deref() {
        Some("") | None => comment_repo::clear_record_comment(&state.db, record_id).await?,
        Some(comment) => {
            comment_repo::set_record_comment(
                &state.db,
                record_id,
                zone_id,
                &name,
                &req.rtype,
                comment,
                &principal.username,
            )
            .await?
        }
    }

    // moved to a different RRset: push the vacated one too
    if existing.name != name || existing.rtype != req.rtype {
        sync_rrset(&state, &zone, &existing.name, &existing.rtype).await;
    }
    sync_rrset(&state, &zone, &name, &req.rtype).await;

    let record = record_repo::find(&state.db, record_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let comment = comments::resolve_comment(&state.db, record_id, zone_id, &name, &req.rtype).await?;

    Ok(Json(ApiResponse::ok(
        "record updated",
        RecordDto::new(&zone, record, comment),
    )))
}

// DELETE /api/zones/{zone_id}/records/{record_id}
pub async fn delete_record(
    Authenticated(principal): Authenticated,
    Extension(state): Extension<SharedState>,
    Path((zone_id, record_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let zone = accessible_zone(&state, &principal, zone_id).await?;

    let record = record_repo::find(&state.db, record_id)
        .await?
        .filter(|r| r.zone_id == zone_id)
        .ok_or(AppError::NotFound)?;

    if !record_repo::delete(&state.db, record_id).await? {
        return Err(AppError::NotFound);
    }

    sync_rrset(&state, &zone, &record.name, &record.rtype).await;
    info!(
        "record {}/{} deleted from zone {}",
        record.name, record.rtype, zone.name
    );

    Ok(Json(ApiResponse::ok("record deleted", ())))
}
