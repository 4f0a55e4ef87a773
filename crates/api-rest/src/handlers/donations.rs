//! Donation lifecycle endpoints: schedule, collect, test, cancel, separate.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::wire::{
    CancelDonationReq, CollectDonationReq, DonationRes, ListDonationsRes, ListUnitsRes,
    RecordTestsReq, ScheduleDonationReq, SeparateComponentsReq, UnitRes,
};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/donations",
    request_body = ScheduleDonationReq,
    responses(
        (status = 201, description = "Donation scheduled", body = DonationRes),
        (status = 404, description = "Donor not found", body = ErrorBody),
        (status = 409, description = "Donor is deferred", body = ErrorBody)
    )
)]
/// Schedule a donation appointment
///
/// The donor must exist and must not be inside their minimum interval
/// since the last donation.
///
/// # Errors
/// Returns `404 Not Found` if the donor does not exist, and
/// `409 Conflict` with code `DONOR_DEFERRED` when they donated too recently.
#[axum::debug_handler]
pub async fn schedule_donation(
    State(state): State<AppState>,
    Json(req): Json<ScheduleDonationReq>,
) -> Result<(StatusCode, Json<DonationRes>), ApiError> {
    let donation = state
        .donations
        .schedule(req.donor_id, req.scheduled_date, req.notes)?;
    Ok((StatusCode::CREATED, Json(donation.into())))
}

#[utoipa::path(
    get,
    path = "/donations",
    responses(
        (status = 200, description = "All donations in creation order", body = ListDonationsRes)
    )
)]
#[axum::debug_handler]
pub async fn list_donations(
    State(state): State<AppState>,
) -> Result<Json<ListDonationsRes>, ApiError> {
    let donations = state
        .donations
        .list()?
        .into_iter()
        .map(DonationRes::from)
        .collect();
    Ok(Json(ListDonationsRes { donations }))
}

#[utoipa::path(
    get,
    path = "/donations/{id}",
    params(("id" = Uuid, Path, description = "Donation id")),
    responses(
        (status = 200, description = "The donation", body = DonationRes),
        (status = 404, description = "Donation not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_donation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<DonationRes>, ApiError> {
    let donation = state.donations.get(id)?;
    Ok(Json(donation.into()))
}

#[utoipa::path(
    post,
    path = "/donations/{id}/collect",
    params(("id" = Uuid, Path, description = "Donation id")),
    request_body = CollectDonationReq,
    responses(
        (status = 200, description = "Blood collected", body = DonationRes),
        (status = 400, description = "Malformed vitals", body = ErrorBody),
        (status = 409, description = "Donor ineligible or donation not SCHEDULED", body = ErrorBody)
    )
)]
/// Record collection vitals and draw blood
///
/// Vitals or screening answers that disqualify the donor leave the
/// donation SCHEDULED; the response lists every failed requirement so the
/// collector can explain the deferral in one conversation.
///
/// # Errors
/// Returns `409 Conflict` with code `INELIGIBLE_DONOR` (all reasons) or
/// `INVALID_TRANSITION`, and `400 Bad Request` for an impossible
/// measurement shape.
#[axum::debug_handler]
pub async fn collect_donation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<CollectDonationReq>,
) -> Result<Json<DonationRes>, ApiError> {
    let donation = state.donations.collect(id, req.into_vitals())?;
    Ok(Json(donation.into()))
}

#[utoipa::path(
    post,
    path = "/donations/{id}/tests",
    params(("id" = Uuid, Path, description = "Donation id")),
    request_body = RecordTestsReq,
    responses(
        (status = 200, description = "Results recorded; status is TESTED or REJECTED", body = DonationRes),
        (status = 400, description = "Implausible laboratory value", body = ErrorBody),
        (status = 409, description = "Donation not COLLECTED", body = ErrorBody)
    )
)]
/// Record laboratory test results
///
/// A positive infection marker moves the donation to REJECTED; that is a
/// successful call, not an error, and the response carries the rejection
/// reason.
#[axum::debug_handler]
pub async fn record_test_results(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<RecordTestsReq>,
) -> Result<Json<DonationRes>, ApiError> {
    let donation = state.donations.record_test_results(id, req.into_results())?;
    Ok(Json(donation.into()))
}

#[utoipa::path(
    post,
    path = "/donations/{id}/cancel",
    params(("id" = Uuid, Path, description = "Donation id")),
    request_body = CancelDonationReq,
    responses(
        (status = 200, description = "Donation cancelled", body = DonationRes),
        (status = 409, description = "Donation already collected", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn cancel_donation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<CancelDonationReq>,
) -> Result<Json<DonationRes>, ApiError> {
    let donation = state.donations.cancel(id, req.reason)?;
    Ok(Json(donation.into()))
}

#[utoipa::path(
    post,
    path = "/donations/{id}/components",
    params(("id" = Uuid, Path, description = "Donation id")),
    request_body = SeparateComponentsReq,
    responses(
        (status = 201, description = "Components separated into inventory", body = ListUnitsRes),
        (status = 400, description = "Invalid specs or volume exceeded", body = ErrorBody),
        (status = 409, description = "Donation not TESTED", body = ErrorBody)
    )
)]
/// Separate a tested donation into component units
///
/// All-or-nothing: if the component volumes exceed the collected volume,
/// no unit is created. On success the donation is PROCESSED and the
/// donor's eligibility clock restarts from the collection date.
///
/// # Errors
/// Returns `400 Bad Request` with code `VOLUME_EXCEEDED` or `VALIDATION`,
/// and `409 Conflict` when the donation is not TESTED.
#[axum::debug_handler]
pub async fn separate_components(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<SeparateComponentsReq>,
) -> Result<(StatusCode, Json<ListUnitsRes>), ApiError> {
    let specs: Vec<_> = req.components.into_iter().map(Into::into).collect();
    let units = state.donations.separate(id, &specs)?;

    let today = Utc::now().date_naive();
    let units = units.iter().map(|u| UnitRes::from_unit(u, today)).collect();
    Ok((StatusCode::CREATED, Json(ListUnitsRes { units })))
}
