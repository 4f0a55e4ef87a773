//! Blood units: inventory state, expiry arithmetic, and the quality gate.
//!
//! A unit's `status` is the single discriminator driving behaviour. Expiry
//! is *computed* from the expiry date on every read; the stored status only
//! catches up when a mutating operation calls [`BloodUnit::reconcile_expiry`]
//! first. Read paths never write.

use crate::blood_type::BloodType;
use crate::component::ComponentType;
use crate::error::{BankError, BankResult};
use bloodbank_types::UnitNumber;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Inventory states of a blood unit. USED and DISCARDED are absolute sinks;
/// EXPIRED units may still be discarded (disposal is an operation too).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    Available,
    Reserved,
    Used,
    Expired,
    Discarded,
}

impl UnitStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UnitStatus::Used | UnitStatus::Discarded)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitStatus::Available => "AVAILABLE",
            UnitStatus::Reserved => "RESERVED",
            UnitStatus::Used => "USED",
            UnitStatus::Expired => "EXPIRED",
            UnitStatus::Discarded => "DISCARDED",
        };
        write!(f, "{label}")
    }
}

/// What the inspector saw, axis by axis, plus their overall verdict.
///
/// `passed` is the inspector's call, recorded as given; the four axes are
/// findings, not a formula the gate recomputes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFindings {
    pub appearance_ok: bool,
    pub storage_temp_ok: bool,
    pub packaging_ok: bool,
    pub labeling_ok: bool,
    pub passed: bool,
    pub notes: Option<String>,
    pub inspected_by: String,
}

/// A completed quality control inspection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControlRecord {
    pub findings: InspectionFindings,
    pub inspected_at: DateTime<Utc>,
}

/// Links a reserved unit back to the request holding it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub request_id: Uuid,
    pub reserved_at: DateTime<Utc>,
}

/// A single typed blood component in inventory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BloodUnit {
    pub id: Uuid,
    pub unit_number: UnitNumber,
    /// `None` for units added to inventory directly, outside a donation.
    pub donation_id: Option<Uuid>,
    pub blood_type: BloodType,
    pub component_type: ComponentType,
    pub volume_ml: u32,
    pub collection_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: UnitStatus,
    pub quality_control: Option<QualityControlRecord>,
    pub reservation: Option<Reservation>,
    pub discard_reason: Option<String>,
}

impl BloodUnit {
    pub fn new(
        donation_id: Option<Uuid>,
        blood_type: BloodType,
        component_type: ComponentType,
        volume_ml: u32,
        collection_date: NaiveDate,
        expiry_date: NaiveDate,
    ) -> Self {
        let id = Uuid::new_v4();
        BloodUnit {
            id,
            unit_number: UnitNumber::from_uuid(&id),
            donation_id,
            blood_type,
            component_type,
            volume_ml,
            collection_date,
            expiry_date,
            status: UnitStatus::Available,
            quality_control: None,
            reservation: None,
            discard_reason: None,
        }
    }

    // ---- expiry arithmetic (pure, date-based) ----

    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) <= 0
    }

    /// An available unit inside the warning window. Units already reserved,
    /// used or discarded are nobody's problem to rotate forward.
    pub fn is_expiring_soon(&self, today: NaiveDate, window_days: u32) -> bool {
        let days = self.days_until_expiry(today);
        self.status == UnitStatus::Available && days > 0 && days <= i64::from(window_days)
    }

    /// The status a reader should act on: an AVAILABLE unit past its expiry
    /// date reads as EXPIRED even before any write has caught up.
    pub fn effective_status(&self, today: NaiveDate) -> UnitStatus {
        if self.status == UnitStatus::Available && self.is_expired(today) {
            UnitStatus::Expired
        } else {
            self.status
        }
    }

    /// Persist AVAILABLE → EXPIRED when the date has passed. Every mutating
    /// operation must call this before doing anything else to the unit.
    /// Returns whether a write happened.
    pub fn reconcile_expiry(&mut self, today: NaiveDate) -> bool {
        if self.status == UnitStatus::Available && self.is_expired(today) {
            self.status = UnitStatus::Expired;
            true
        } else {
            false
        }
    }

    // ---- quality control gate ----

    /// One-shot inspection. A passing verdict leaves the unit AVAILABLE with
    /// the record attached; a failing verdict discards it with a reason
    /// derived from the inspector's notes.
    ///
    /// # Errors
    ///
    /// `AlreadyInspected` on a second inspection; `InvalidTransition` when
    /// the unit is no longer AVAILABLE (expired, reserved, or gone).
    pub fn inspect(&mut self, findings: InspectionFindings, now: DateTime<Utc>) -> BankResult<()> {
        if self.quality_control.is_some() {
            return Err(BankError::AlreadyInspected);
        }
        if self.status != UnitStatus::Available {
            return Err(BankError::InvalidTransition {
                entity: "unit",
                current: self.status.to_string(),
                action: "inspect",
            });
        }

        let passed = findings.passed;
        let notes = findings.notes.clone();
        self.quality_control = Some(QualityControlRecord {
            findings,
            inspected_at: now,
        });
        if !passed {
            self.status = UnitStatus::Discarded;
            self.discard_reason = Some(
                notes
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Failed quality control inspection".to_string()),
            );
        }
        Ok(())
    }

    /// Whether the quality gate admits this unit into allocation.
    pub fn qc_admitted(&self, qc_required: bool) -> bool {
        if !qc_required {
            return true;
        }
        self.quality_control
            .as_ref()
            .is_some_and(|qc| qc.findings.passed)
    }

    // ---- dispositions ----

    /// AVAILABLE → RESERVED on behalf of a request.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn reserve(&mut self, request_id: Uuid, now: DateTime<Utc>) -> BankResult<()> {
        if self.status != UnitStatus::Available {
            return Err(BankError::InvalidTransition {
                entity: "unit",
                current: self.status.to_string(),
                action: "reserve",
            });
        }
        self.status = UnitStatus::Reserved;
        self.reservation = Some(Reservation {
            request_id,
            reserved_at: now,
        });
        Ok(())
    }

    /// RESERVED → AVAILABLE, clearing the reservation.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn release(&mut self) -> BankResult<()> {
        if self.status != UnitStatus::Reserved {
            return Err(BankError::InvalidTransition {
                entity: "unit",
                current: self.status.to_string(),
                action: "release",
            });
        }
        self.status = UnitStatus::Available;
        self.reservation = None;
        Ok(())
    }

    /// RESERVED → USED at transfusion completion. The reservation stays on
    /// the record so the consuming request remains traceable.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn mark_used(&mut self) -> BankResult<()> {
        if self.status != UnitStatus::Reserved {
            return Err(BankError::InvalidTransition {
                entity: "unit",
                current: self.status.to_string(),
                action: "mark used",
            });
        }
        self.status = UnitStatus::Used;
        Ok(())
    }

    /// Dispose of an AVAILABLE or EXPIRED unit. Reserved blood must be
    /// released first; used or discarded blood is already out of play.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from RESERVED, USED, or DISCARDED.
    pub fn discard(&mut self, reason: String) -> BankResult<()> {
        match self.status {
            UnitStatus::Available | UnitStatus::Expired => {
                self.status = UnitStatus::Discarded;
                self.discard_reason = Some(reason);
                Ok(())
            }
            other => Err(BankError::InvalidTransition {
                entity: "unit",
                current: other.to_string(),
                action: "discard",
            }),
        }
    }
}
