//! Error taxonomy for the blood bank core.
//!
//! Variants map onto the failure classes the engine distinguishes:
//! validation of input shape/range, illegal state transitions, invariant
//! violations rejected atomically, and optimistic-concurrency conflicts.
//! Domain-safety outcomes (an infection-positive donation, a failed quality
//! inspection) are *not* errors: they are recorded terminal states.

use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// Bad input shape or range, rejected before any mutation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A laboratory value outside its hard plausibility bounds.
    #[error("{field} {value} is outside the plausible range [{min}, {max}]")]
    InvalidTestValue {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An operation that is not legal from the entity's current state.
    /// The current state is included so the caller can see what raced ahead.
    #[error("{entity} cannot {action} while {current}")]
    InvalidTransition {
        entity: &'static str,
        current: String,
        action: &'static str,
    },

    /// Collection-time vitals or screening answers disqualify the donor.
    /// The donation record is untouched; the caller should cancel instead.
    #[error("donor does not meet collection requirements: {}", reasons.join("; "))]
    IneligibleDonor { reasons: Vec<String> },

    /// The donor's minimum interval since their last donation has not elapsed.
    #[error("donor is deferred until {until}")]
    DonorDeferred { until: NaiveDate },

    /// Component volumes would exceed the donated volume. No units are
    /// created when this is raised. The requested total is carried as `u64`
    /// so it reports faithfully even when the parts sum past `u32`.
    #[error("requested components total {requested_ml} mL but the donation holds {available_ml} mL")]
    VolumeExceeded { requested_ml: u64, available_ml: u32 },

    /// The quality control gate is one-shot; a unit is inspected at most once.
    #[error("unit has already been inspected")]
    AlreadyInspected,

    /// The record changed under us after the engine's automatic retry.
    #[error("record was modified concurrently; retry the operation")]
    ConcurrentModification,

    /// A storage lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
}

pub type BankResult<T> = std::result::Result<T, BankError>;
