//! Inventory endpoints: direct add, listing, summary, inspection, discard.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use bloodbank_core::{BloodType, InventoryFilter, UnitStatus};

use crate::error::{ApiError, ErrorBody};
use crate::wire::{
    AddUnitReq, DiscardUnitReq, InspectUnitReq, InventorySummaryRes, ListUnitsRes, UnitRes,
};
use crate::AppState;

/// Query-string filters for the inventory listing. All optional; statuses
/// match the unit's *effective* status, so date-expired stock answers to
/// `EXPIRED` even before reconciliation.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    #[param(value_type = Option<String>, example = "O_NEGATIVE")]
    pub blood_type: Option<BloodType>,
    #[param(value_type = Option<String>, example = "AVAILABLE")]
    pub status: Option<UnitStatus>,
    pub expiring_within_days: Option<u32>,
}

#[utoipa::path(
    post,
    path = "/units",
    request_body = AddUnitReq,
    responses(
        (status = 201, description = "Unit added to inventory", body = UnitRes),
        (status = 400, description = "Invalid unit details", body = ErrorBody)
    )
)]
/// Add a unit directly to inventory
///
/// For stock that arrives from outside the donation pipeline, e.g. a
/// transfer from another bank. The unit carries no donation reference.
#[axum::debug_handler]
pub async fn add_unit(
    State(state): State<AppState>,
    Json(req): Json<AddUnitReq>,
) -> Result<(StatusCode, Json<UnitRes>), ApiError> {
    let unit = state.inventory.add_unit(
        req.blood_type,
        req.component_type,
        req.volume_ml,
        req.collection_date,
        req.expiry_days,
    )?;
    let today = Utc::now().date_naive();
    Ok((StatusCode::CREATED, Json(UnitRes::from_unit(&unit, today))))
}

#[utoipa::path(
    get,
    path = "/units",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Matching units, soonest expiry first", body = ListUnitsRes)
    )
)]
/// List inventory
///
/// Supports narrowing by blood type, effective status, and an
/// expiring-within window in days.
#[axum::debug_handler]
pub async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<ListUnitsRes>, ApiError> {
    let filter = InventoryFilter {
        blood_type: query.blood_type,
        status: query.status,
        expiring_within_days: query.expiring_within_days,
    };
    let today = Utc::now().date_naive();
    let units = state
        .inventory
        .list(&filter)?
        .iter()
        .map(|u| UnitRes::from_unit(u, today))
        .collect();
    Ok(Json(ListUnitsRes { units }))
}

#[utoipa::path(
    get,
    path = "/units/summary",
    responses(
        (status = 200, description = "Available stock per blood type", body = InventorySummaryRes)
    )
)]
/// Summarise available stock per blood type
///
/// Counts AVAILABLE units for each of the eight blood types, with the
/// slice of each that falls inside the expiry warning window.
#[axum::debug_handler]
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<Json<InventorySummaryRes>, ApiError> {
    let availability = state
        .inventory
        .summary()?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(InventorySummaryRes { availability }))
}

#[utoipa::path(
    post,
    path = "/units/{id}/inspect",
    params(("id" = Uuid, Path, description = "Unit id")),
    request_body = InspectUnitReq,
    responses(
        (status = 200, description = "Inspection recorded; failed units are DISCARDED", body = UnitRes),
        (status = 404, description = "Unit not found", body = ErrorBody),
        (status = 409, description = "Already inspected, or unit not AVAILABLE", body = ErrorBody)
    )
)]
/// Record a unit's one-shot quality inspection
///
/// A failed inspection discards the unit; that is a successful call and
/// the response shows the DISCARDED status with the derived reason.
///
/// # Errors
/// Returns `409 Conflict` with code `ALREADY_INSPECTED` on a second
/// inspection, or `INVALID_TRANSITION` when the unit has expired or left
/// AVAILABLE.
#[axum::debug_handler]
pub async fn inspect_unit(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<InspectUnitReq>,
) -> Result<Json<UnitRes>, ApiError> {
    let unit = state.inventory.inspect(id, req.into_findings())?;
    let today = Utc::now().date_naive();
    Ok(Json(UnitRes::from_unit(&unit, today)))
}

#[utoipa::path(
    post,
    path = "/units/{id}/discard",
    params(("id" = Uuid, Path, description = "Unit id")),
    request_body = DiscardUnitReq,
    responses(
        (status = 200, description = "Unit discarded", body = UnitRes),
        (status = 404, description = "Unit not found", body = ErrorBody),
        (status = 409, description = "Unit is reserved, used or already discarded", body = ErrorBody)
    )
)]
/// Discard a unit
///
/// Legal from AVAILABLE and from EXPIRED (disposal of outdated stock).
#[axum::debug_handler]
pub async fn discard_unit(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<DiscardUnitReq>,
) -> Result<Json<UnitRes>, ApiError> {
    let unit = state.inventory.discard(id, req.reason)?;
    let today = Utc::now().date_naive();
    Ok(Json(UnitRes::from_unit(&unit, today)))
}
