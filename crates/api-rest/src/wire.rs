//! Wire types for the REST API.
//!
//! Request bodies are strict (`deny_unknown_fields`) so a misspelled field
//! fails loudly instead of silently defaulting; response bodies mirror the
//! core entities. Every type here derives `utoipa::ToSchema` and is listed
//! in the OpenAPI document.

use bloodbank_core::{
    BloodRequest, BloodType, BloodUnit, CollectionRecord, CollectionVitals, ComponentSpec,
    ComponentType, Donation, DonationStatus, Donor, Eligibility, InspectionFindings, QueueReport,
    RequestPriority, RequestStatus, TestResults, Transfusion, TransfusionStatus, TypeAvailability,
    UnitStatus,
};
use bloodbank_core::{BloodPressure, RiskScreening};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

// ---- donors ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterDonorReq {
    pub name: String,
    #[schema(value_type = String, example = "O_NEGATIVE")]
    pub blood_type: BloodType,
    pub weight_kg: f64,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorRes {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String, example = "O_NEGATIVE")]
    pub blood_type: BloodType,
    pub weight_kg: f64,
    pub contact: Option<String>,
    pub last_donation_date: Option<NaiveDate>,
    /// Derived from the last donation date and the configured interval;
    /// `null` when the donor has never donated.
    pub eligible_to_donate_since: Option<NaiveDate>,
    pub registered_at: DateTime<Utc>,
}

impl DonorRes {
    pub fn from_donor(donor: &Donor, interval_days: u32) -> Self {
        Self {
            id: donor.id,
            name: donor.name.as_str().to_string(),
            blood_type: donor.blood_type,
            weight_kg: donor.weight_kg,
            contact: donor.contact.clone(),
            last_donation_date: donor.last_donation_date,
            eligible_to_donate_since: donor.eligible_to_donate_since(interval_days),
            registered_at: donor.registered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDonorsRes {
    pub donors: Vec<DonorRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityRes {
    #[schema(example = "ELIGIBLE")]
    pub status: String,
    pub until: Option<NaiveDate>,
    pub reason: Option<String>,
}

impl From<Eligibility> for EligibilityRes {
    fn from(eligibility: Eligibility) -> Self {
        match eligibility {
            Eligibility::Eligible => Self {
                status: "ELIGIBLE".into(),
                until: None,
                reason: None,
            },
            Eligibility::Deferred { until, reason } => Self {
                status: "DEFERRED".into(),
                until: Some(until),
                reason: Some(reason),
            },
        }
    }
}

// ---- donations ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ScheduleDonationReq {
    pub donor_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct BloodPressureDto {
    #[schema(example = 120)]
    pub systolic: u32,
    #[schema(example = 80)]
    pub diastolic: u32,
}

/// Pre-donation questionnaire. Every answer must be given explicitly;
/// any `true` defers the donor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RiskScreeningDto {
    pub recent_illness: bool,
    pub recent_vaccination: bool,
    pub recent_surgery: bool,
    pub recent_tattoo: bool,
    pub pregnancy: bool,
    pub high_risk_behaviour: bool,
}

impl From<RiskScreeningDto> for RiskScreening {
    fn from(dto: RiskScreeningDto) -> Self {
        Self {
            recent_illness: dto.recent_illness,
            recent_vaccination: dto.recent_vaccination,
            recent_surgery: dto.recent_surgery,
            recent_tattoo: dto.recent_tattoo,
            pregnancy: dto.pregnancy,
            high_risk_behaviour: dto.high_risk_behaviour,
        }
    }
}

impl From<RiskScreening> for RiskScreeningDto {
    fn from(screening: RiskScreening) -> Self {
        Self {
            recent_illness: screening.recent_illness,
            recent_vaccination: screening.recent_vaccination,
            recent_surgery: screening.recent_surgery,
            recent_tattoo: screening.recent_tattoo,
            pregnancy: screening.pregnancy,
            high_risk_behaviour: screening.high_risk_behaviour,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CollectDonationReq {
    #[schema(example = 13.5)]
    pub hemoglobin_g_dl: f64,
    pub blood_pressure: BloodPressureDto,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub pulse_bpm: u32,
    pub units_collected: u32,
    #[schema(example = 450)]
    pub volume_ml: u32,
    pub screening: RiskScreeningDto,
}

impl CollectDonationReq {
    pub fn into_vitals(self) -> CollectionVitals {
        CollectionVitals {
            hemoglobin_g_dl: self.hemoglobin_g_dl,
            blood_pressure: BloodPressure {
                systolic: self.blood_pressure.systolic,
                diastolic: self.blood_pressure.diastolic,
            },
            weight_kg: self.weight_kg,
            temperature_c: self.temperature_c,
            pulse_bpm: self.pulse_bpm,
            units_collected: self.units_collected,
            volume_ml: self.volume_ml,
            screening: self.screening.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordTestsReq {
    pub hiv: bool,
    pub hepatitis_b: bool,
    pub hepatitis_c: bool,
    pub syphilis: bool,
    pub malaria: bool,
    #[schema(example = 13.8)]
    pub hemoglobin_g_dl: f64,
    pub notes: Option<String>,
}

impl RecordTestsReq {
    pub fn into_results(self) -> TestResults {
        TestResults {
            hiv: self.hiv,
            hepatitis_b: self.hepatitis_b,
            hepatitis_c: self.hepatitis_c,
            syphilis: self.syphilis,
            malaria: self.malaria,
            hemoglobin_g_dl: self.hemoglobin_g_dl,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CancelDonationReq {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpecReq {
    #[schema(value_type = String, example = "RED_CELLS")]
    pub component_type: ComponentType,
    pub volume_ml: u32,
    /// Overrides the component's default shelf life when present.
    pub expiry_days: Option<u32>,
    pub notes: Option<String>,
}

impl From<ComponentSpecReq> for ComponentSpec {
    fn from(req: ComponentSpecReq) -> Self {
        Self {
            component_type: req.component_type,
            volume_ml: req.volume_ml,
            expiry_days: req.expiry_days,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SeparateComponentsReq {
    pub components: Vec<ComponentSpecReq>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionRecordRes {
    pub hemoglobin_g_dl: f64,
    pub blood_pressure: BloodPressureDto,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub pulse_bpm: u32,
    pub units_collected: u32,
    pub volume_ml: u32,
    pub screening: RiskScreeningDto,
    pub collected_on: NaiveDate,
}

impl From<&CollectionRecord> for CollectionRecordRes {
    fn from(record: &CollectionRecord) -> Self {
        Self {
            hemoglobin_g_dl: record.vitals.hemoglobin_g_dl,
            blood_pressure: BloodPressureDto {
                systolic: record.vitals.blood_pressure.systolic,
                diastolic: record.vitals.blood_pressure.diastolic,
            },
            weight_kg: record.vitals.weight_kg,
            temperature_c: record.vitals.temperature_c,
            pulse_bpm: record.vitals.pulse_bpm,
            units_collected: record.vitals.units_collected,
            volume_ml: record.vitals.volume_ml,
            screening: record.vitals.screening.into(),
            collected_on: record.collected_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestResultsRes {
    pub hiv: bool,
    pub hepatitis_b: bool,
    pub hepatitis_c: bool,
    pub syphilis: bool,
    pub malaria: bool,
    pub hemoglobin_g_dl: f64,
    pub notes: Option<String>,
}

impl From<&TestResults> for TestResultsRes {
    fn from(results: &TestResults) -> Self {
        Self {
            hiv: results.hiv,
            hepatitis_b: results.hepatitis_b,
            hepatitis_c: results.hepatitis_c,
            syphilis: results.syphilis,
            malaria: results.malaria,
            hemoglobin_g_dl: results.hemoglobin_g_dl,
            notes: results.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationRes {
    pub id: Uuid,
    pub donor_id: Uuid,
    #[schema(value_type = String, example = "SCHEDULED")]
    pub status: DonationStatus,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
    pub collection: Option<CollectionRecordRes>,
    pub test_results: Option<TestResultsRes>,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for DonationRes {
    fn from(donation: Donation) -> Self {
        Self {
            id: donation.id,
            donor_id: donation.donor_id,
            status: donation.status,
            scheduled_date: donation.scheduled_date,
            notes: donation.notes,
            collection: donation.collection.as_ref().map(CollectionRecordRes::from),
            test_results: donation.test_results.as_ref().map(TestResultsRes::from),
            rejection_reason: donation.rejection_reason,
            cancellation_reason: donation.cancellation_reason,
            created_at: donation.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDonationsRes {
    pub donations: Vec<DonationRes>,
}

// ---- units ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddUnitReq {
    #[schema(value_type = String, example = "A_POSITIVE")]
    pub blood_type: BloodType,
    #[schema(value_type = String, example = "RED_CELLS")]
    pub component_type: ComponentType,
    pub volume_ml: u32,
    /// Defaults to today when omitted.
    pub collection_date: Option<NaiveDate>,
    pub expiry_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct InspectUnitReq {
    pub appearance_ok: bool,
    pub storage_temp_ok: bool,
    pub packaging_ok: bool,
    pub labeling_ok: bool,
    pub passed: bool,
    pub notes: Option<String>,
    pub inspected_by: String,
}

impl InspectUnitReq {
    pub fn into_findings(self) -> InspectionFindings {
        InspectionFindings {
            appearance_ok: self.appearance_ok,
            storage_temp_ok: self.storage_temp_ok,
            packaging_ok: self.packaging_ok,
            labeling_ok: self.labeling_ok,
            passed: self.passed,
            notes: self.notes,
            inspected_by: self.inspected_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DiscardUnitReq {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QualityControlRes {
    pub appearance_ok: bool,
    pub storage_temp_ok: bool,
    pub packaging_ok: bool,
    pub labeling_ok: bool,
    pub passed: bool,
    pub notes: Option<String>,
    pub inspected_by: String,
    pub inspected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationRes {
    pub request_id: Uuid,
    pub reserved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitRes {
    pub id: Uuid,
    #[schema(example = "BU-1A2B3C4D")]
    pub unit_number: String,
    pub donation_id: Option<Uuid>,
    #[schema(value_type = String, example = "O_NEGATIVE")]
    pub blood_type: BloodType,
    #[schema(value_type = String, example = "RED_CELLS")]
    pub component_type: ComponentType,
    pub volume_ml: u32,
    pub collection_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    /// Effective status: a date-expired unit reads EXPIRED even when the
    /// stored row has not been reconciled yet.
    #[schema(value_type = String, example = "AVAILABLE")]
    pub status: UnitStatus,
    pub quality_control: Option<QualityControlRes>,
    pub reservation: Option<ReservationRes>,
    pub discard_reason: Option<String>,
}

impl UnitRes {
    pub fn from_unit(unit: &BloodUnit, today: NaiveDate) -> Self {
        Self {
            id: unit.id,
            unit_number: unit.unit_number.as_str().to_string(),
            donation_id: unit.donation_id,
            blood_type: unit.blood_type,
            component_type: unit.component_type,
            volume_ml: unit.volume_ml,
            collection_date: unit.collection_date,
            expiry_date: unit.expiry_date,
            days_until_expiry: unit.days_until_expiry(today),
            status: unit.effective_status(today),
            quality_control: unit.quality_control.as_ref().map(|qc| QualityControlRes {
                appearance_ok: qc.findings.appearance_ok,
                storage_temp_ok: qc.findings.storage_temp_ok,
                packaging_ok: qc.findings.packaging_ok,
                labeling_ok: qc.findings.labeling_ok,
                passed: qc.findings.passed,
                notes: qc.findings.notes.clone(),
                inspected_by: qc.findings.inspected_by.clone(),
                inspected_at: qc.inspected_at,
            }),
            reservation: unit.reservation.as_ref().map(|r| ReservationRes {
                request_id: r.request_id,
                reserved_at: r.reserved_at,
            }),
            discard_reason: unit.discard_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUnitsRes {
    pub units: Vec<UnitRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypeAvailabilityRes {
    #[schema(value_type = String, example = "O_NEGATIVE")]
    pub blood_type: BloodType,
    pub available_units: u32,
    pub expiring_soon: u32,
}

impl From<TypeAvailability> for TypeAvailabilityRes {
    fn from(availability: TypeAvailability) -> Self {
        Self {
            blood_type: availability.blood_type,
            available_units: availability.available_units,
            expiring_soon: availability.expiring_soon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventorySummaryRes {
    pub availability: Vec<TypeAvailabilityRes>,
}

// ---- requests & transfusions ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmitRequestReq {
    pub patient_id: Uuid,
    #[schema(value_type = String, example = "AB_NEGATIVE")]
    pub blood_type: BloodType,
    #[schema(example = 2)]
    pub quantity: u32,
    #[schema(value_type = String, example = "URGENT")]
    pub priority: RequestPriority,
    pub requested_by: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ApproveRequestReq {
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RejectRequestReq {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestRes {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[schema(value_type = String, example = "AB_NEGATIVE")]
    pub blood_type: BloodType,
    pub quantity: u32,
    #[schema(value_type = String, example = "STANDARD")]
    pub priority: RequestPriority,
    #[schema(value_type = String, example = "PENDING")]
    pub status: RequestStatus,
    pub requested_by: String,
    pub approved_by: Option<String>,
    pub reason: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BloodRequest> for RequestRes {
    fn from(request: BloodRequest) -> Self {
        Self {
            id: request.id,
            patient_id: request.patient_id,
            blood_type: request.blood_type,
            quantity: request.quantity,
            priority: request.priority,
            status: request.status,
            requested_by: request.requested_by.into_inner(),
            approved_by: request.approved_by.map(bloodbank_types::NonEmptyText::into_inner),
            reason: request.reason.into_inner(),
            rejection_reason: request.rejection_reason,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListRequestsRes {
    pub requests: Vec<RequestRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalRes {
    pub request: RequestRes,
    pub reserved_units: Vec<UnitRes>,
}

/// 409 body when the bank cannot fill a request. Nothing was reserved and
/// the request is still PENDING.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShortfallRes {
    pub request_id: Uuid,
    pub requested: u32,
    pub matched: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueReportRes {
    pub approved: Vec<Uuid>,
    pub shortfalls: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

impl From<QueueReport> for QueueReportRes {
    fn from(report: QueueReport) -> Self {
        Self {
            approved: report.approved,
            shortfalls: report.shortfalls,
            skipped: report.skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ScheduleTransfusionReq {
    pub scheduled_for: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CompleteTransfusionReq {
    pub performed_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransfusionRes {
    pub id: Uuid,
    pub request_id: Uuid,
    pub patient_id: Uuid,
    pub unit_ids: Vec<Uuid>,
    #[schema(value_type = String, example = "SCHEDULED")]
    pub status: TransfusionStatus,
    pub performed_by: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub performed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<Transfusion> for TransfusionRes {
    fn from(transfusion: Transfusion) -> Self {
        Self {
            id: transfusion.id,
            request_id: transfusion.request_id,
            patient_id: transfusion.patient_id,
            unit_ids: transfusion.unit_ids,
            status: transfusion.status,
            performed_by: transfusion
                .performed_by
                .map(bloodbank_types::NonEmptyText::into_inner),
            scheduled_for: transfusion.scheduled_for,
            performed_on: transfusion.performed_on,
            created_at: transfusion.created_at,
        }
    }
}
