//! Donor records and donation eligibility.
//!
//! The eligibility date is always derived from `last_donation_date` and the
//! configured interval, never stored, so the two can never disagree.

use crate::blood_type::BloodType;
use bloodbank_types::NonEmptyText;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of an eligibility check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Eligibility {
    Eligible,
    Deferred { until: NaiveDate, reason: String },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// A registered blood donor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Donor {
    pub id: Uuid,
    pub name: NonEmptyText,
    pub blood_type: BloodType,
    pub weight_kg: f64,
    pub contact: Option<String>,
    /// Collection date of the most recent donation that reached PROCESSED.
    pub last_donation_date: Option<NaiveDate>,
    pub registered_at: DateTime<Utc>,
}

impl Donor {
    pub fn new(
        name: NonEmptyText,
        blood_type: BloodType,
        weight_kg: f64,
        contact: Option<String>,
    ) -> Self {
        Donor {
            id: Uuid::new_v4(),
            name,
            blood_type,
            weight_kg,
            contact,
            last_donation_date: None,
            registered_at: Utc::now(),
        }
    }

    /// First date on which this donor may donate again, derived from the
    /// last completed donation. `None` means the donor has never donated.
    /// An interval that runs past the supported calendar saturates to its
    /// end: deferred, never eligible.
    pub fn eligible_to_donate_since(&self, interval_days: u32) -> Option<NaiveDate> {
        self.last_donation_date.map(|last| {
            last.checked_add_signed(Duration::days(i64::from(interval_days)))
                .unwrap_or(NaiveDate::MAX)
        })
    }

    /// Whether the donor may schedule a donation today.
    pub fn can_schedule(&self, today: NaiveDate, interval_days: u32) -> Eligibility {
        match self.eligible_to_donate_since(interval_days) {
            None => Eligibility::Eligible,
            Some(since) if since <= today => Eligibility::Eligible,
            Some(since) => Eligibility::Deferred {
                until: since,
                reason: format!(
                    "last donation on {}, eligible again on {since}",
                    self.last_donation_date
                        .map(|d| d.to_string())
                        .unwrap_or_default()
                ),
            },
        }
    }
}
