//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into
//! services as `Arc<CoreConfig>`. Request handling never reads process-wide
//! environment variables, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use crate::constants::{DEFAULT_DONATION_INTERVAL_DAYS, DEFAULT_EXPIRY_WARNING_DAYS};
use crate::error::{BankError, BankResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    donation_interval_days: u32,
    expiry_warning_days: u32,
    qc_required: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Validation` if the donation interval or the
    /// expiry warning window is zero.
    pub fn new(
        donation_interval_days: u32,
        expiry_warning_days: u32,
        qc_required: bool,
    ) -> BankResult<Self> {
        if donation_interval_days == 0 {
            return Err(BankError::Validation(
                "donation interval must be at least one day".into(),
            ));
        }
        if expiry_warning_days == 0 {
            return Err(BankError::Validation(
                "expiry warning window must be at least one day".into(),
            ));
        }

        Ok(Self {
            donation_interval_days,
            expiry_warning_days,
            qc_required,
        })
    }

    /// Configuration with the standard clinical defaults (56-day interval,
    /// 7-day warning window, quality control required).
    pub fn standard() -> Self {
        Self {
            donation_interval_days: DEFAULT_DONATION_INTERVAL_DAYS,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            qc_required: true,
        }
    }

    /// Minimum number of days between whole-blood donations.
    pub fn donation_interval_days(&self) -> u32 {
        self.donation_interval_days
    }

    /// How many days before expiry a unit counts as "expiring soon".
    pub fn expiry_warning_days(&self) -> u32 {
        self.expiry_warning_days
    }

    /// Whether a passed quality inspection is required before a unit may be
    /// allocated. When false, freshly separated units are allocatable
    /// immediately.
    pub fn qc_required(&self) -> bool {
        self.qc_required
    }
}

/// Parse a day-count setting from an optional environment value.
///
/// `None`, empty, or whitespace-only values fall back to `default`.
///
/// # Errors
///
/// Returns `BankError::Validation` if the value is present but not a
/// positive integer.
pub fn days_from_env_value(value: Option<String>, default: u32) -> BankResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| {
                BankError::Validation(format!("expected a positive day count, got '{raw}'"))
            }),
    }
}

/// Parse a boolean setting from an optional environment value.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` (case-insensitive);
/// `None` or empty falls back to `default`.
///
/// # Errors
///
/// Returns `BankError::Validation` on any other value.
pub fn bool_from_env_value(value: Option<String>, default: bool) -> BankResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(default),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => Err(BankError::Validation(format!(
            "expected a boolean setting, got '{other}'"
        ))),
    }
}
