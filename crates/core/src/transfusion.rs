//! Transfusion records: the final consumer of reserved blood.

use crate::error::{BankError, BankResult};
use bloodbank_types::NonEmptyText;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransfusionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for TransfusionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransfusionStatus::Scheduled => "SCHEDULED",
            TransfusionStatus::Completed => "COMPLETED",
            TransfusionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{label}")
    }
}

/// One planned or performed transfusion against an approved request.
/// The unit set is fixed at creation; a COMPLETED record never changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transfusion {
    pub id: Uuid,
    pub request_id: Uuid,
    pub patient_id: Uuid,
    pub unit_ids: Vec<Uuid>,
    pub status: TransfusionStatus,
    pub performed_by: Option<NonEmptyText>,
    pub scheduled_for: Option<NaiveDate>,
    pub performed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Transfusion {
    /// Plan a transfusion ahead of time. The request's units stay RESERVED.
    pub fn schedule(
        request_id: Uuid,
        patient_id: Uuid,
        unit_ids: Vec<Uuid>,
        scheduled_for: NaiveDate,
    ) -> Self {
        Transfusion {
            id: Uuid::new_v4(),
            request_id,
            patient_id,
            unit_ids,
            status: TransfusionStatus::Scheduled,
            performed_by: None,
            scheduled_for: Some(scheduled_for),
            performed_on: None,
            created_at: Utc::now(),
        }
    }

    /// Record a transfusion performed without prior scheduling.
    pub fn performed(
        request_id: Uuid,
        patient_id: Uuid,
        unit_ids: Vec<Uuid>,
        performed_by: NonEmptyText,
        performed_on: NaiveDate,
    ) -> Self {
        Transfusion {
            id: Uuid::new_v4(),
            request_id,
            patient_id,
            unit_ids,
            status: TransfusionStatus::Completed,
            performed_by: Some(performed_by),
            scheduled_for: None,
            performed_on: Some(performed_on),
            created_at: Utc::now(),
        }
    }

    /// SCHEDULED → COMPLETED.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn complete(&mut self, performed_by: NonEmptyText, performed_on: NaiveDate) -> BankResult<()> {
        if self.status != TransfusionStatus::Scheduled {
            return Err(BankError::InvalidTransition {
                entity: "transfusion",
                current: self.status.to_string(),
                action: "complete",
            });
        }
        self.status = TransfusionStatus::Completed;
        self.performed_by = Some(performed_by);
        self.performed_on = Some(performed_on);
        Ok(())
    }

    /// SCHEDULED → CANCELLED. The blood goes back to being merely reserved;
    /// releasing it is the request's decision, not the transfusion's.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from any other status.
    pub fn cancel(&mut self) -> BankResult<()> {
        if self.status != TransfusionStatus::Scheduled {
            return Err(BankError::InvalidTransition {
                entity: "transfusion",
                current: self.status.to_string(),
                action: "cancel",
            });
        }
        self.status = TransfusionStatus::Cancelled;
        Ok(())
    }
}
