//! Entitlement record handlers.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use uidhub_core::error::AppError;
use uidhub_entity::{EntitlementView, UpsertMetadata};

use crate::dto::request::{AddDaysRequest, UpsertUidRequest};
use crate::dto::response::{
    AddDaysResponse, CheckAccessResponse, ListUidsResponse, RemoveUidResponse, UpsertUidResponse,
};
use crate::state::AppState;

/// GET /uids
pub async fn list_uids(
    State(state): State<AppState>,
) -> Result<Json<ListUidsResponse>, AppError> {
    let uids = state.entitlements.list_all().await?;
    Ok(Json(ListUidsResponse {
        total: uids.len() as u64,
        uids,
    }))
}

/// POST /uid
pub async fn upsert_uid(
    State(state): State<AppState>,
    Json(req): Json<UpsertUidRequest>,
) -> Result<Json<UpsertUidResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .entitlements
        .upsert_metadata(UpsertMetadata {
            uid: req.uid,
            region: req.region,
            openid: req.openid,
            access_token: req.access_token,
            platform: req.platform,
        })
        .await?;

    Ok(Json(UpsertUidResponse {
        success: true,
        uid: outcome.uid,
        total_uids: outcome.total,
    }))
}

/// GET /uid/{uid}
pub async fn get_uid(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<EntitlementView>, AppError> {
    let view = state.entitlements.get(&uid).await?;
    Ok(Json(view))
}

/// GET /uid/{uid}/check
pub async fn check_uid(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<CheckAccessResponse>, AppError> {
    let status = state.entitlements.check_active(&uid).await?;
    Ok(Json(status.into()))
}

/// POST /uid/{uid}/adddays
pub async fn add_days(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(req): Json<AddDaysRequest>,
) -> Result<Json<AddDaysResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state.entitlements.grant_days(&uid, req.days).await?;
    Ok(Json(AddDaysResponse {
        success: true,
        uid: outcome.uid,
        days_added: outcome.days_added,
        expire_date: outcome.expire_date,
    }))
}

/// DELETE /uid/{uid}/remove
pub async fn remove_uid(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<RemoveUidResponse>, AppError> {
    state.entitlements.remove(&uid).await?;
    Ok(Json(RemoveUidResponse {
        success: true,
        message: format!("UID {uid} removed"),
    }))
}
