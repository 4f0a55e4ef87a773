//! Clinical blood requests and their approval lifecycle.

use crate::blood_type::BloodType;
use crate::error::{BankError, BankResult};
use bloodbank_types::NonEmptyText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Clinical urgency. The derive order makes STANDARD < URGENT < EMERGENCY,
/// which queue processing relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPriority {
    Standard,
    Urgent,
    Emergency,
}

impl fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestPriority::Standard => "STANDARD",
            RequestPriority::Urgent => "URGENT",
            RequestPriority::Emergency => "EMERGENCY",
        };
        write!(f, "{label}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Fulfilled => "FULFILLED",
        };
        write!(f, "{label}")
    }
}

/// A request for `quantity` compatible units on behalf of a patient.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub blood_type: BloodType,
    pub quantity: u32,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub requested_by: NonEmptyText,
    pub approved_by: Option<NonEmptyText>,
    pub reason: NonEmptyText,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BloodRequest {
    /// # Errors
    ///
    /// `Validation` when the quantity is zero.
    pub fn submit(
        patient_id: Uuid,
        blood_type: BloodType,
        quantity: u32,
        priority: RequestPriority,
        requested_by: NonEmptyText,
        reason: NonEmptyText,
    ) -> BankResult<Self> {
        if quantity == 0 {
            return Err(BankError::Validation(
                "requested quantity must be at least one unit".into(),
            ));
        }
        Ok(BloodRequest {
            id: Uuid::new_v4(),
            patient_id,
            blood_type,
            quantity,
            priority,
            status: RequestStatus::Pending,
            requested_by,
            approved_by: None,
            reason,
            rejection_reason: None,
            created_at: Utc::now(),
        })
    }

    fn illegal(&self, action: &'static str) -> BankError {
        BankError::InvalidTransition {
            entity: "request",
            current: self.status.to_string(),
            action,
        }
    }

    /// PENDING → APPROVED, once allocation has reserved its units.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn approve(&mut self, approved_by: Option<NonEmptyText>) -> BankResult<()> {
        if self.status != RequestStatus::Pending {
            return Err(self.illegal("approve"));
        }
        self.status = RequestStatus::Approved;
        self.approved_by = approved_by;
        Ok(())
    }

    /// PENDING or APPROVED → REJECTED. The caller is responsible for
    /// releasing any units the request holds.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` once FULFILLED or already REJECTED.
    pub fn reject(&mut self, reason: String) -> BankResult<()> {
        match self.status {
            RequestStatus::Pending | RequestStatus::Approved => {
                self.status = RequestStatus::Rejected;
                self.rejection_reason = Some(reason);
                Ok(())
            }
            _ => Err(self.illegal("reject")),
        }
    }

    /// APPROVED → FULFILLED at transfusion completion.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn fulfil(&mut self) -> BankResult<()> {
        if self.status != RequestStatus::Approved {
            return Err(self.illegal("fulfil"));
        }
        self.status = RequestStatus::Fulfilled;
        Ok(())
    }
}
