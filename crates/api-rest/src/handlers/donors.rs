//! Donor registration and eligibility endpoints.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use bloodbank_types::NonEmptyText;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::wire::{DonorRes, EligibilityRes, ListDonorsRes, RegisterDonorReq};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/donors",
    request_body = RegisterDonorReq,
    responses(
        (status = 201, description = "Donor registered", body = DonorRes),
        (status = 400, description = "Invalid donor details", body = ErrorBody)
    )
)]
/// Register a new donor
///
/// Records the donor's identity, blood type and weight. The donor starts
/// with no donation history, so they are immediately eligible to book.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the name is blank, or
/// - the weight is not a positive number.
#[axum::debug_handler]
pub async fn register_donor(
    State(state): State<AppState>,
    Json(req): Json<RegisterDonorReq>,
) -> Result<(StatusCode, Json<DonorRes>), ApiError> {
    let name = NonEmptyText::new(&req.name)?;
    let donor = state
        .donors
        .register(name, req.blood_type, req.weight_kg, req.contact)?;
    let res = DonorRes::from_donor(&donor, state.cfg.donation_interval_days());
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    get,
    path = "/donors",
    responses(
        (status = 200, description = "All registered donors", body = ListDonorsRes)
    )
)]
/// List all registered donors
///
/// Donors are returned in registration order, each with their derived
/// next-eligible date.
#[axum::debug_handler]
pub async fn list_donors(State(state): State<AppState>) -> Result<Json<ListDonorsRes>, ApiError> {
    let interval = state.cfg.donation_interval_days();
    let donors = state
        .donors
        .list()?
        .iter()
        .map(|d| DonorRes::from_donor(d, interval))
        .collect();
    Ok(Json(ListDonorsRes { donors }))
}

#[utoipa::path(
    get,
    path = "/donors/{id}/eligibility",
    params(("id" = Uuid, Path, description = "Donor id")),
    responses(
        (status = 200, description = "Eligibility verdict for today", body = EligibilityRes),
        (status = 404, description = "Donor not found", body = ErrorBody)
    )
)]
/// Check whether a donor may donate today
///
/// # Errors
/// Returns `404 Not Found` if the donor does not exist.
#[axum::debug_handler]
pub async fn donor_eligibility(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<EligibilityRes>, ApiError> {
    let eligibility = state.donors.eligibility(id)?;
    Ok(Json(eligibility.into()))
}
