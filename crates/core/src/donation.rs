//! The donation lifecycle state machine.
//!
//! A donation moves SCHEDULED → COLLECTED → TESTED → PROCESSED on the happy
//! path, or terminates early in REJECTED (infection found in testing) or
//! CANCELLED (never collected). Legality of every action is decided by one
//! explicit table, [`DonationStatus::permits`], so there is a single place
//! to read the whole machine. Illegal actions fail without mutating the
//! record.

use crate::constants::{INFECTION_REJECTION_REASON, LAB_HEMOGLOBIN_MAX_G_DL, LAB_HEMOGLOBIN_MIN_G_DL};
use crate::error::{BankError, BankResult};
use crate::vitals::CollectionVitals;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle states of a donation. This set is deliberately *closed*; new
/// states mean revisiting the transition table, not adding a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Scheduled,
    Collected,
    Tested,
    Rejected,
    Processed,
    Cancelled,
}

/// Actions a caller can attempt against a donation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DonationAction {
    Collect,
    RecordTests,
    Separate,
    Cancel,
}

impl DonationStatus {
    /// The transition table. Everything not listed here is illegal.
    pub fn permits(self, action: DonationAction) -> bool {
        use DonationAction::*;
        use DonationStatus::*;
        matches!(
            (self, action),
            (Scheduled, Collect)
                | (Scheduled, Cancel)
                | (Collected, RecordTests)
                | (Tested, Separate)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DonationStatus::Rejected | DonationStatus::Processed | DonationStatus::Cancelled
        )
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DonationStatus::Scheduled => "SCHEDULED",
            DonationStatus::Collected => "COLLECTED",
            DonationStatus::Tested => "TESTED",
            DonationStatus::Rejected => "REJECTED",
            DonationStatus::Processed => "PROCESSED",
            DonationStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{label}")
    }
}

/// Infectious disease markers and lab values from testing a collected
/// donation. Any positive marker rejects the whole donation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub hiv: bool,
    pub hepatitis_b: bool,
    pub hepatitis_c: bool,
    pub syphilis: bool,
    pub malaria: bool,
    /// Laboratory hemoglobin, distinct from the collection-time reading.
    pub hemoglobin_g_dl: f64,
    pub notes: Option<String>,
}

impl TestResults {
    pub fn has_infection(&self) -> bool {
        self.hiv || self.hepatitis_b || self.hepatitis_c || self.syphilis || self.malaria
    }

    /// Hard plausibility bound on the lab hemoglobin. This is a data-entry
    /// check, not a fitness threshold.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidTestValue` when the value is outside
    /// [8, 20] g/dL or not a number.
    pub fn validate(&self) -> BankResult<()> {
        if !self.hemoglobin_g_dl.is_finite()
            || self.hemoglobin_g_dl < LAB_HEMOGLOBIN_MIN_G_DL
            || self.hemoglobin_g_dl > LAB_HEMOGLOBIN_MAX_G_DL
        {
            return Err(BankError::InvalidTestValue {
                field: "hemoglobin",
                value: self.hemoglobin_g_dl,
                min: LAB_HEMOGLOBIN_MIN_G_DL,
                max: LAB_HEMOGLOBIN_MAX_G_DL,
            });
        }
        Ok(())
    }
}

/// Everything recorded at the moment of collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub vitals: CollectionVitals,
    pub collected_on: NaiveDate,
}

/// A single donation event, from appointment to terminal state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub status: DonationStatus,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
    pub collection: Option<CollectionRecord>,
    pub test_results: Option<TestResults>,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    pub fn schedule(donor_id: Uuid, scheduled_date: NaiveDate, notes: Option<String>) -> Self {
        Donation {
            id: Uuid::new_v4(),
            donor_id,
            status: DonationStatus::Scheduled,
            scheduled_date,
            notes,
            collection: None,
            test_results: None,
            rejection_reason: None,
            cancellation_reason: None,
            created_at: Utc::now(),
        }
    }

    fn require(&self, action: DonationAction, name: &'static str) -> BankResult<()> {
        if self.status.permits(action) {
            Ok(())
        } else {
            Err(BankError::InvalidTransition {
                entity: "donation",
                current: self.status.to_string(),
                action: name,
            })
        }
    }

    /// SCHEDULED → COLLECTED. Vitals are validated and the donor's fitness
    /// checked first; failing fitness leaves the record SCHEDULED so the
    /// caller can cancel it instead.
    ///
    /// # Errors
    ///
    /// `InvalidTransition`, `Validation`, or `IneligibleDonor`.
    pub fn collect(&mut self, vitals: CollectionVitals, collected_on: NaiveDate) -> BankResult<()> {
        self.require(DonationAction::Collect, "collect")?;
        vitals.validate()?;

        let reasons = vitals.deferral_reasons();
        if !reasons.is_empty() {
            return Err(BankError::IneligibleDonor { reasons });
        }

        self.collection = Some(CollectionRecord {
            vitals,
            collected_on,
        });
        self.status = DonationStatus::Collected;
        Ok(())
    }

    /// COLLECTED → TESTED, or COLLECTED → REJECTED when any infection marker
    /// is positive. A rejected donation keeps its results for audit and must
    /// never reach component separation.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` or `InvalidTestValue`.
    pub fn record_test_results(&mut self, results: TestResults) -> BankResult<()> {
        self.require(DonationAction::RecordTests, "record test results")?;
        results.validate()?;

        let infected = results.has_infection();
        self.test_results = Some(results);
        if infected {
            self.status = DonationStatus::Rejected;
            self.rejection_reason = Some(INFECTION_REJECTION_REASON.to_string());
        } else {
            self.status = DonationStatus::Tested;
        }
        Ok(())
    }

    /// SCHEDULED → CANCELLED. A cancelled appointment never touches the
    /// donor's eligibility; no blood changed hands.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other state.
    pub fn cancel(&mut self, reason: String) -> BankResult<()> {
        self.require(DonationAction::Cancel, "cancel")?;
        self.status = DonationStatus::Cancelled;
        self.cancellation_reason = Some(reason);
        Ok(())
    }

    /// TESTED → PROCESSED, called by component separation once units exist.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other state.
    pub fn mark_processed(&mut self) -> BankResult<()> {
        self.require(DonationAction::Separate, "separate components")?;
        self.status = DonationStatus::Processed;
        Ok(())
    }

    /// The collection record, required by testing and separation.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the donation was never collected.
    pub fn collection_record(&self) -> BankResult<&CollectionRecord> {
        self.collection
            .as_ref()
            .ok_or(BankError::InvalidTransition {
                entity: "donation",
                current: self.status.to_string(),
                action: "read collection record",
            })
    }
}
