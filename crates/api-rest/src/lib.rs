//! # API REST
//!
//! REST API for the blood bank core.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Domain rules live in `bloodbank-core`; this crate only translates
//! between wire DTOs and core services.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bloodbank_core::{
    BankStore, CoreConfig, DonationService, DonorService, InventoryService, RequestService,
};

pub mod error;
pub mod handlers;
pub mod wire;

use wire::HealthRes;

/// Shared state for all request handlers.
///
/// The four services share one configuration and one store; handlers
/// reach the domain exclusively through them.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub donors: Arc<DonorService>,
    pub donations: Arc<DonationService>,
    pub inventory: Arc<InventoryService>,
    pub requests: Arc<RequestService>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<BankStore>) -> Self {
        Self {
            donors: Arc::new(DonorService::new(cfg.clone(), store.clone())),
            donations: Arc::new(DonationService::new(cfg.clone(), store.clone())),
            inventory: Arc::new(InventoryService::new(cfg.clone(), store.clone())),
            requests: Arc::new(RequestService::new(cfg.clone(), store)),
            cfg,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        handlers::donors::register_donor,
        handlers::donors::list_donors,
        handlers::donors::donor_eligibility,
        handlers::donations::schedule_donation,
        handlers::donations::list_donations,
        handlers::donations::get_donation,
        handlers::donations::collect_donation,
        handlers::donations::record_test_results,
        handlers::donations::cancel_donation,
        handlers::donations::separate_components,
        handlers::units::add_unit,
        handlers::units::list_units,
        handlers::units::inventory_summary,
        handlers::units::inspect_unit,
        handlers::units::discard_unit,
        handlers::requests::submit_request,
        handlers::requests::list_requests,
        handlers::requests::approve_request,
        handlers::requests::reject_request,
        handlers::requests::process_queue,
        handlers::requests::schedule_transfusion,
        handlers::requests::complete_transfusion,
        handlers::requests::cancel_transfusion,
    ),
    components(schemas(
        wire::HealthRes,
        wire::RegisterDonorReq,
        wire::DonorRes,
        wire::ListDonorsRes,
        wire::EligibilityRes,
        wire::ScheduleDonationReq,
        wire::BloodPressureDto,
        wire::RiskScreeningDto,
        wire::CollectDonationReq,
        wire::RecordTestsReq,
        wire::CancelDonationReq,
        wire::ComponentSpecReq,
        wire::SeparateComponentsReq,
        wire::CollectionRecordRes,
        wire::TestResultsRes,
        wire::DonationRes,
        wire::ListDonationsRes,
        wire::AddUnitReq,
        wire::InspectUnitReq,
        wire::DiscardUnitReq,
        wire::QualityControlRes,
        wire::ReservationRes,
        wire::UnitRes,
        wire::ListUnitsRes,
        wire::TypeAvailabilityRes,
        wire::InventorySummaryRes,
        wire::SubmitRequestReq,
        wire::ApproveRequestReq,
        wire::RejectRequestReq,
        wire::RequestRes,
        wire::ListRequestsRes,
        wire::ApprovalRes,
        wire::ShortfallRes,
        wire::QueueReportRes,
        wire::ScheduleTransfusionReq,
        wire::CompleteTransfusionReq,
        wire::TransfusionRes,
        error::ErrorBody,
        error::ErrorDetail,
    ))
)]
pub struct ApiDoc;

/// Build the blood bank router with every endpoint, the Swagger UI and a
/// permissive CORS layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/donors", post(handlers::donors::register_donor))
        .route("/donors", get(handlers::donors::list_donors))
        .route("/donors/:id/eligibility", get(handlers::donors::donor_eligibility))
        .route("/donations", post(handlers::donations::schedule_donation))
        .route("/donations", get(handlers::donations::list_donations))
        .route("/donations/:id", get(handlers::donations::get_donation))
        .route("/donations/:id/collect", post(handlers::donations::collect_donation))
        .route("/donations/:id/tests", post(handlers::donations::record_test_results))
        .route("/donations/:id/cancel", post(handlers::donations::cancel_donation))
        .route("/donations/:id/components", post(handlers::donations::separate_components))
        .route("/units", post(handlers::units::add_unit))
        .route("/units", get(handlers::units::list_units))
        .route("/units/summary", get(handlers::units::inventory_summary))
        .route("/units/:id/inspect", post(handlers::units::inspect_unit))
        .route("/units/:id/discard", post(handlers::units::discard_unit))
        .route("/requests", post(handlers::requests::submit_request))
        .route("/requests", get(handlers::requests::list_requests))
        .route("/requests/process", post(handlers::requests::process_queue))
        .route("/requests/:id/approve", post(handlers::requests::approve_request))
        .route("/requests/:id/reject", post(handlers::requests::reject_request))
        .route("/requests/:id/transfusion", post(handlers::requests::schedule_transfusion))
        .route(
            "/requests/:id/transfusion/complete",
            post(handlers::requests::complete_transfusion),
        )
        .route("/transfusions/:id/cancel", post(handlers::requests::cancel_transfusion))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Blood bank API is alive".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let cfg = Arc::new(CoreConfig::standard());
        build_router(AppState::new(cfg, Arc::new(BankStore::new())))
    }

    /// Router with the quality control gate switched off, so freshly
    /// separated or added units are allocatable without inspection.
    fn app_without_qc() -> Router {
        let cfg = CoreConfig::new(56, 7, false).expect("valid config");
        build_router(AppState::new(Arc::new(cfg), Arc::new(BankStore::new())))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn passing_vitals() -> Value {
        json!({
            "hemoglobin_g_dl": 13.2,
            "blood_pressure": {"systolic": 118, "diastolic": 76},
            "weight_kg": 70.0,
            "temperature_c": 36.6,
            "pulse_bpm": 72,
            "units_collected": 1,
            "volume_ml": 450,
            "screening": {
                "recent_illness": false,
                "recent_vaccination": false,
                "recent_surgery": false,
                "recent_tattoo": false,
                "pregnancy": false,
                "high_risk_behaviour": false
            }
        })
    }

    fn clean_tests() -> Value {
        json!({
            "hiv": false,
            "hepatitis_b": false,
            "hepatitis_c": false,
            "syphilis": false,
            "malaria": false,
            "hemoglobin_g_dl": 13.8,
            "notes": null
        })
    }

    fn passing_inspection() -> Value {
        json!({
            "appearance_ok": true,
            "storage_temp_ok": true,
            "packaging_ok": true,
            "labeling_ok": true,
            "passed": true,
            "notes": null,
            "inspected_by": "QC Tech"
        })
    }

    async fn register_donor(app: &Router, name: &str, blood_type: &str) -> String {
        let (status, json) = send(
            app,
            post_json(
                "/donors",
                json!({"name": name, "blood_type": blood_type, "weight_kg": 70.0, "contact": null}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_str().unwrap().to_string()
    }

    /// Registers a donor and walks one donation to TESTED, returning the
    /// donation id.
    async fn tested_donation(app: &Router, blood_type: &str) -> String {
        let donor_id = register_donor(app, "Pipeline Donor", blood_type).await;
        let today = Utc::now().date_naive().to_string();

        let (status, json) = send(
            app,
            post_json(
                "/donations",
                json!({"donor_id": donor_id, "scheduled_date": today, "notes": null}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let donation_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/donations/{donation_id}/collect");
        let (status, _) = send(app, post_json(&uri, passing_vitals())).await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/donations/{donation_id}/tests");
        let (status, json) = send(app, post_json(&uri, clean_tests())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "TESTED");

        donation_id
    }

    #[tokio::test]
    async fn health_is_alive() {
        let (status, json) = send(&app(), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn unknown_routes_return_404() {
        let (status, _) = send(&app(), get_req("/nonexistent")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn donor_to_patient_journey_over_http() {
        let app = app();
        let today = Utc::now().date_naive();

        let donation_id = tested_donation(&app, "O_NEGATIVE").await;

        // Separate into two components.
        let uri = format!("/donations/{donation_id}/components");
        let (status, json) = send(
            &app,
            post_json(
                &uri,
                json!({"components": [
                    {"component_type": "RED_CELLS", "volume_ml": 250},
                    {"component_type": "PLASMA", "volume_ml": 180}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let units = json["units"].as_array().unwrap();
        assert_eq!(units.len(), 2);
        let unit_ids: Vec<String> = units
            .iter()
            .map(|u| u["id"].as_str().unwrap().to_string())
            .collect();

        // The donor's eligibility clock restarted today.
        let (_, json) = send(&app, get_req("/donors")).await;
        let donor = &json["donors"][0];
        assert_eq!(donor["last_donation_date"], today.to_string());
        assert_eq!(
            donor["eligible_to_donate_since"],
            (today + Duration::days(56)).to_string()
        );

        // Quality control admits both units.
        for unit_id in &unit_ids {
            let uri = format!("/units/{unit_id}/inspect");
            let (status, json) = send(&app, post_json(&uri, passing_inspection())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "AVAILABLE");
            assert_eq!(json["quality_control"]["passed"], true);
        }

        // An AB+ patient can receive O- components.
        let (status, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "AB_POSITIVE",
                    "quantity": 2,
                    "priority": "URGENT",
                    "requested_by": "Dr Ellison",
                    "reason": "Elective surgery"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let request_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/requests/{request_id}/approve");
        let (status, json) = send(&app, post_json(&uri, json!({"approved_by": "Dr Osei"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["request"]["status"], "APPROVED");
        assert_eq!(json["request"]["approved_by"], "Dr Osei");
        assert_eq!(json["reserved_units"].as_array().unwrap().len(), 2);

        let uri = format!("/requests/{request_id}/transfusion/complete");
        let (status, json) = send(&app, post_json(&uri, json!({"performed_by": "Dr Varga"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["unit_ids"].as_array().unwrap().len(), 2);

        let (_, json) = send(&app, get_req("/units?status=USED")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn eligibility_of_unknown_donor_is_404() {
        let uri = format!("/donors/{}/eligibility", uuid::Uuid::new_v4());
        let (status, json) = send(&app(), get_req(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn failed_vitals_return_every_reason_and_leave_the_donation_scheduled() {
        let app = app();
        let donor_id = register_donor(&app, "Deferred Donor", "A_POSITIVE").await;
        let today = Utc::now().date_naive().to_string();

        let (_, json) = send(
            &app,
            post_json(
                "/donations",
                json!({"donor_id": donor_id, "scheduled_date": today, "notes": null}),
            ),
        )
        .await;
        let donation_id = json["id"].as_str().unwrap().to_string();

        let mut vitals = passing_vitals();
        vitals["hemoglobin_g_dl"] = json!(11.0);
        vitals["temperature_c"] = json!(38.2);

        let uri = format!("/donations/{donation_id}/collect");
        let (status, json) = send(&app, post_json(&uri, vitals)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "INELIGIBLE_DONOR");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("hemoglobin"));
        assert!(message.contains("temperature"));

        let uri = format!("/donations/{donation_id}");
        let (_, json) = send(&app, get_req(&uri)).await;
        assert_eq!(json["status"], "SCHEDULED");
    }

    #[tokio::test]
    async fn positive_syphilis_screen_rejects_the_donation() {
        let app = app();
        let donor_id = register_donor(&app, "Screened Donor", "B_NEGATIVE").await;
        let today = Utc::now().date_naive().to_string();

        let (_, json) = send(
            &app,
            post_json(
                "/donations",
                json!({"donor_id": donor_id, "scheduled_date": today, "notes": null}),
            ),
        )
        .await;
        let donation_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/donations/{donation_id}/collect");
        send(&app, post_json(&uri, passing_vitals())).await;

        let mut results = clean_tests();
        results["syphilis"] = json!(true);
        let uri = format!("/donations/{donation_id}/tests");
        let (status, json) = send(&app, post_json(&uri, results)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "REJECTED");
        assert_eq!(json["rejection_reason"], "Failed infectious disease screening");
    }

    #[tokio::test]
    async fn overdrawn_separation_creates_nothing() {
        let app = app();
        let donation_id = tested_donation(&app, "O_POSITIVE").await;

        let uri = format!("/donations/{donation_id}/components");
        let (status, json) = send(
            &app,
            post_json(
                &uri,
                json!({"components": [
                    {"component_type": "RED_CELLS", "volume_ml": 300},
                    {"component_type": "PLASMA", "volume_ml": 300}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VOLUME_EXCEEDED");

        let (_, json) = send(&app, get_req("/units")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 0);

        // The donation is still TESTED, so a corrected plan succeeds.
        let (status, _) = send(
            &app,
            post_json(
                &uri,
                json!({"components": [{"component_type": "RED_CELLS", "volume_ml": 250}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn second_inspection_conflicts() {
        let app = app();
        let (status, json) = send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "A_POSITIVE", "component_type": "PLATELETS", "volume_ml": 300}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let unit_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/units/{unit_id}/inspect");
        let (status, _) = send(&app, post_json(&uri, passing_inspection())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(&app, post_json(&uri, passing_inspection())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "ALREADY_INSPECTED");
    }

    #[tokio::test]
    async fn failed_inspection_discards_the_unit() {
        let app = app();
        let (_, json) = send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "B_POSITIVE", "component_type": "RED_CELLS", "volume_ml": 280}),
            ),
        )
        .await;
        let unit_id = json["id"].as_str().unwrap().to_string();

        let mut findings = passing_inspection();
        findings["appearance_ok"] = json!(false);
        findings["passed"] = json!(false);
        findings["notes"] = json!("Visible clots");

        let uri = format!("/units/{unit_id}/inspect");
        let (status, json) = send(&app, post_json(&uri, findings)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "DISCARDED");
        assert_eq!(json["discard_reason"], "Visible clots");
    }

    #[tokio::test]
    async fn shortfall_reports_the_gap_and_reserves_nothing() {
        let app = app_without_qc();
        let (_, json) = send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "A_NEGATIVE", "component_type": "RED_CELLS", "volume_ml": 250}),
            ),
        )
        .await;
        let unit_id = json["id"].as_str().unwrap().to_string();

        let (_, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "A_NEGATIVE",
                    "quantity": 2,
                    "priority": "STANDARD",
                    "requested_by": "Dr Ellison",
                    "reason": "Anaemia"
                }),
            ),
        )
        .await;
        let request_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/requests/{request_id}/approve");
        let (status, json) = send(&app, post_json(&uri, json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["requested"], 2);
        assert_eq!(json["matched"], 1);

        // Nothing was reserved and the request is still PENDING.
        let (_, json) = send(&app, get_req("/units?status=AVAILABLE")).await;
        assert_eq!(json["units"][0]["id"], unit_id);
        let (_, json) = send(&app, get_req("/requests")).await;
        assert_eq!(json["requests"][0]["status"], "PENDING");
    }

    #[tokio::test]
    async fn rejecting_an_approved_request_releases_its_units() {
        let app = app_without_qc();
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "O_POSITIVE", "component_type": "RED_CELLS", "volume_ml": 250}),
            ),
        )
        .await;

        let (_, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "O_POSITIVE",
                    "quantity": 1,
                    "priority": "URGENT",
                    "requested_by": "Dr Ellison",
                    "reason": "Trauma"
                }),
            ),
        )
        .await;
        let request_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/requests/{request_id}/approve");
        let (status, _) = send(&app, post_json(&uri, json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = send(&app, get_req("/units?status=RESERVED")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 1);

        let uri = format!("/requests/{request_id}/reject");
        let (status, json) = send(&app, post_json(&uri, json!({"reason": "Ordered twice"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "REJECTED");

        let (_, json) = send(&app, get_req("/units?status=AVAILABLE")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 1);
        assert_eq!(json["units"][0]["reservation"], Value::Null);
    }

    #[tokio::test]
    async fn queue_pass_serves_the_emergency_before_the_older_standard() {
        let app = app_without_qc();
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "B_NEGATIVE", "component_type": "RED_CELLS", "volume_ml": 250}),
            ),
        )
        .await;

        let (_, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "B_NEGATIVE",
                    "quantity": 1,
                    "priority": "STANDARD",
                    "requested_by": "Dr Ellison",
                    "reason": "Scheduled surgery"
                }),
            ),
        )
        .await;
        let standard_id = json["id"].as_str().unwrap().to_string();

        let (_, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "B_NEGATIVE",
                    "quantity": 1,
                    "priority": "EMERGENCY",
                    "requested_by": "Dr Ellison",
                    "reason": "Haemorrhage"
                }),
            ),
        )
        .await;
        let emergency_id = json["id"].as_str().unwrap().to_string();

        let (status, json) = send(&app, post_json("/requests/process", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["approved"], json!([emergency_id]));
        assert_eq!(json["shortfalls"], json!([standard_id]));
        assert_eq!(json["skipped"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn transfusion_can_be_planned_and_called_off() {
        let app = app_without_qc();
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "AB_NEGATIVE", "component_type": "PLASMA", "volume_ml": 200}),
            ),
        )
        .await;

        let (_, json) = send(
            &app,
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "AB_NEGATIVE",
                    "quantity": 1,
                    "priority": "STANDARD",
                    "requested_by": "Dr Ellison",
                    "reason": "Plasma exchange"
                }),
            ),
        )
        .await;
        let request_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/requests/{request_id}/approve");
        send(&app, post_json(&uri, json!({}))).await;

        // The past is not a plan.
        let yesterday = (Utc::now().date_naive() - Duration::days(1)).to_string();
        let uri = format!("/requests/{request_id}/transfusion");
        let (status, json) = send(&app, post_json(&uri, json!({"scheduled_for": yesterday}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION");

        let tomorrow = (Utc::now().date_naive() + Duration::days(1)).to_string();
        let (status, json) = send(&app, post_json(&uri, json!({"scheduled_for": tomorrow}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["status"], "SCHEDULED");
        let transfusion_id = json["id"].as_str().unwrap().to_string();

        let uri = format!("/transfusions/{transfusion_id}/cancel");
        let (status, json) = send(&app, post_json(&uri, json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "CANCELLED");

        // The blood stays reserved for the still-approved request.
        let (_, json) = send(&app, get_req("/units?status=RESERVED")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_request_is_rejected() {
        let (status, json) = send(
            &app(),
            post_json(
                "/requests",
                json!({
                    "patient_id": uuid::Uuid::new_v4(),
                    "blood_type": "O_POSITIVE",
                    "quantity": 0,
                    "priority": "STANDARD",
                    "requested_by": "Dr Ellison",
                    "reason": "Typo"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn unknown_fields_in_a_request_body_are_refused() {
        let (status, _) = send(
            &app(),
            post_json(
                "/donors",
                json!({"name": "Typo Donor", "blood_type": "O_POSITIVE", "weight_kg": 70.0, "wieght": 70.0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn inventory_filters_narrow_by_blood_type() {
        let app = app();
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "O_NEGATIVE", "component_type": "RED_CELLS", "volume_ml": 250}),
            ),
        )
        .await;
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "A_POSITIVE", "component_type": "PLASMA", "volume_ml": 200}),
            ),
        )
        .await;

        let (_, json) = send(&app, get_req("/units?blood_type=O_NEGATIVE")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 1);
        assert_eq!(json["units"][0]["blood_type"], "O_NEGATIVE");

        let (_, json) = send(&app, get_req("/units")).await;
        assert_eq!(json["units"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn summary_covers_all_eight_blood_types() {
        let app = app();
        send(
            &app,
            post_json(
                "/units",
                json!({"blood_type": "O_NEGATIVE", "component_type": "RED_CELLS", "volume_ml": 250}),
            ),
        )
        .await;

        let (status, json) = send(&app, get_req("/units/summary")).await;
        assert_eq!(status, StatusCode::OK);
        let availability = json["availability"].as_array().unwrap();
        assert_eq!(availability.len(), 8);
        let o_neg = availability
            .iter()
            .find(|a| a["blood_type"] == "O_NEGATIVE")
            .unwrap();
        assert_eq!(o_neg["available_units"], 1);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, json) = send(&app(), get_req("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["paths"]["/donations/{id}/collect"].is_object());
        assert!(json["paths"]["/requests/{id}/approve"].is_object());
    }
}
