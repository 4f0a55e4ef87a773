//! Blood request and transfusion endpoints.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bloodbank_types::NonEmptyText;
use chrono::Utc;
use uuid::Uuid;

use bloodbank_core::ApprovalOutcome;

use crate::error::{ApiError, ErrorBody};
use crate::wire::{
    ApprovalRes, ApproveRequestReq, CompleteTransfusionReq, ListRequestsRes, QueueReportRes,
    RejectRequestReq, RequestRes, ScheduleTransfusionReq, ShortfallRes, SubmitRequestReq,
    TransfusionRes, UnitRes,
};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/requests",
    request_body = SubmitRequestReq,
    responses(
        (status = 201, description = "Request filed as PENDING", body = RequestRes),
        (status = 400, description = "Invalid request details", body = ErrorBody)
    )
)]
/// Submit a blood request for a patient
///
/// # Errors
/// Returns `400 Bad Request` if the quantity is zero or the requester or
/// reason is blank.
#[axum::debug_handler]
pub async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequestReq>,
) -> Result<(StatusCode, Json<RequestRes>), ApiError> {
    let requested_by = NonEmptyText::new(&req.requested_by)?;
    let reason = NonEmptyText::new(&req.reason)?;
    let request = state.requests.submit(
        req.patient_id,
        req.blood_type,
        req.quantity,
        req.priority,
        requested_by,
        reason,
    )?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "All requests in creation order", body = ListRequestsRes)
    )
)]
#[axum::debug_handler]
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<ListRequestsRes>, ApiError> {
    let requests = state
        .requests
        .list()?
        .into_iter()
        .map(RequestRes::from)
        .collect();
    Ok(Json(ListRequestsRes { requests }))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = ApproveRequestReq,
    responses(
        (status = 200, description = "Approved with reserved units", body = ApprovalRes),
        (status = 409, description = "Insufficient compatible stock", body = ShortfallRes),
        (status = 404, description = "Request not found", body = ErrorBody)
    )
)]
/// Approve a request and reserve compatible stock
///
/// Selection is exact-type first, then cross-compatible, soonest expiry
/// first within each tier. Reservation is all-or-nothing: a shortfall
/// reserves nothing and leaves the request PENDING, reported as a 409
/// with the matched count.
///
/// # Errors
/// Returns `409 Conflict` with code `INVALID_TRANSITION` unless the
/// request is PENDING, or `CONCURRENT_MODIFICATION` when a competing
/// writer wins twice in a row.
#[axum::debug_handler]
pub async fn approve_request(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<ApproveRequestReq>,
) -> Result<Response, ApiError> {
    let approved_by = match req.approved_by {
        Some(name) => Some(NonEmptyText::new(&name)?),
        None => None,
    };

    let today = Utc::now().date_naive();
    match state.requests.approve(id, approved_by)? {
        ApprovalOutcome::Approved {
            request,
            reserved_units,
        } => {
            let reserved_units = reserved_units
                .iter()
                .map(|u| UnitRes::from_unit(u, today))
                .collect();
            let body = ApprovalRes {
                request: request.into(),
                reserved_units,
            };
            Ok(Json(body).into_response())
        }
        ApprovalOutcome::Shortfall {
            request,
            requested,
            matched,
        } => {
            let body = ShortfallRes {
                request_id: request.id,
                requested,
                matched,
            };
            Ok((StatusCode::CONFLICT, Json(body)).into_response())
        }
    }
}

#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = RejectRequestReq,
    responses(
        (status = 200, description = "Request rejected; reserved stock released", body = RequestRes),
        (status = 404, description = "Request not found", body = ErrorBody),
        (status = 409, description = "Request already fulfilled or rejected", body = ErrorBody)
    )
)]
/// Reject a request
///
/// Rejecting an APPROVED request releases its reserved units back to
/// AVAILABLE and cancels any transfusion still scheduled against it.
#[axum::debug_handler]
pub async fn reject_request(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<RejectRequestReq>,
) -> Result<Json<RequestRes>, ApiError> {
    let request = state.requests.reject(id, req.reason)?;
    Ok(Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/requests/process",
    responses(
        (status = 200, description = "One allocation pass over the pending queue", body = QueueReportRes)
    )
)]
/// Process the pending queue
///
/// Walks every PENDING request in priority order (EMERGENCY before URGENT
/// before STANDARD, oldest first within a tier) and tries to approve each.
/// Shortfalls stay PENDING; requests that changed state under the pass are
/// skipped and reported.
#[axum::debug_handler]
pub async fn process_queue(
    State(state): State<AppState>,
) -> Result<Json<QueueReportRes>, ApiError> {
    let report = state.requests.process_pending()?;
    Ok(Json(report.into()))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/transfusion",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = ScheduleTransfusionReq,
    responses(
        (status = 201, description = "Transfusion planned", body = TransfusionRes),
        (status = 400, description = "Date in the past", body = ErrorBody),
        (status = 409, description = "Request not APPROVED, or already planned", body = ErrorBody)
    )
)]
/// Plan a transfusion for an approved request
///
/// The reserved units stay RESERVED until the transfusion is completed or
/// the request is rejected.
#[axum::debug_handler]
pub async fn schedule_transfusion(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<ScheduleTransfusionReq>,
) -> Result<(StatusCode, Json<TransfusionRes>), ApiError> {
    let transfusion = state.requests.schedule_transfusion(id, req.scheduled_for)?;
    Ok((StatusCode::CREATED, Json(transfusion.into())))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/transfusion/complete",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = CompleteTransfusionReq,
    responses(
        (status = 200, description = "Transfusion performed; units consumed", body = TransfusionRes),
        (status = 404, description = "Request not found", body = ErrorBody),
        (status = 409, description = "Request not APPROVED", body = ErrorBody)
    )
)]
/// Complete a transfusion
///
/// Marks the request FULFILLED and every reserved unit USED. Works with
/// or without a previously planned transfusion; a planned record is
/// completed in place.
#[axum::debug_handler]
pub async fn complete_transfusion(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<CompleteTransfusionReq>,
) -> Result<Json<TransfusionRes>, ApiError> {
    let performed_by = NonEmptyText::new(&req.performed_by)?;
    let transfusion = state.requests.complete_transfusion(id, performed_by)?;
    Ok(Json(transfusion.into()))
}

#[utoipa::path(
    post,
    path = "/transfusions/{id}/cancel",
    params(("id" = Uuid, Path, description = "Transfusion id")),
    responses(
        (status = 200, description = "Planned transfusion called off", body = TransfusionRes),
        (status = 404, description = "Transfusion not found", body = ErrorBody),
        (status = 409, description = "Transfusion already completed or cancelled", body = ErrorBody)
    )
)]
/// Cancel a planned transfusion
///
/// The request stays APPROVED and keeps its reserved units; freeing the
/// blood for other patients means rejecting the request itself.
#[axum::debug_handler]
pub async fn cancel_transfusion(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<TransfusionRes>, ApiError> {
    let transfusion = state.requests.cancel_transfusion(id)?;
    Ok(Json(transfusion.into()))
}
