//! Clinical policy constants used throughout the core crate.
//!
//! Collection thresholds and validation bounds live here so the screening
//! and testing code reads against named values rather than magic numbers.
//! Values that sites genuinely tune (donation interval, expiry warning
//! window) are configuration, not constants — see [`crate::config`].

/// Minimum hemoglobin at collection, g/dL.
pub const MIN_HEMOGLOBIN_G_DL: f64 = 12.5;

/// Minimum donor weight at collection, kg.
pub const MIN_WEIGHT_KG: f64 = 50.0;

/// Maximum body temperature at collection, °C.
pub const MAX_TEMPERATURE_C: f64 = 37.5;

/// Acceptable pulse range at collection, bpm.
pub const MIN_PULSE_BPM: u32 = 50;
pub const MAX_PULSE_BPM: u32 = 100;

/// Hard plausibility bounds for a laboratory hemoglobin result, g/dL.
/// Distinct from the collection threshold: values outside this range are
/// treated as data-entry errors, not as clinical findings.
pub const LAB_HEMOGLOBIN_MIN_G_DL: f64 = 8.0;
pub const LAB_HEMOGLOBIN_MAX_G_DL: f64 = 20.0;

/// Default minimum interval between whole-blood donations, days.
pub const DEFAULT_DONATION_INTERVAL_DAYS: u32 = 56;

/// Default "expiring soon" warning window, days.
pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 7;

/// Rejection reason recorded when any infectious disease marker is positive.
/// Audit reports match on the exact text.
pub const INFECTION_REJECTION_REASON: &str = "Failed infectious disease screening";

/// How many times the allocation engine re-runs selection after a
/// concurrent reservation conflict before surfacing the conflict.
pub const ALLOCATION_RETRIES: u32 = 1;
