//! Collection-time vitals and donor risk screening.
//!
//! Both checks are pure: they never touch a record, they only report
//! whether the donor in front of the collection nurse may give blood
//! today and why not. Failing either blocks collection; the caller is
//! expected to cancel the donation instead.

use crate::constants::{
    MAX_PULSE_BPM, MAX_TEMPERATURE_C, MIN_HEMOGLOBIN_G_DL, MIN_PULSE_BPM, MIN_WEIGHT_KG,
};
use crate::error::{BankError, BankResult};
use serde::{Deserialize, Serialize};

/// A blood pressure reading in mmHg.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl std::fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// Self-reported risk screening answers taken at collection.
///
/// Every answer must be negative for the donor to pass screening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScreening {
    pub recent_illness: bool,
    pub recent_vaccination: bool,
    pub recent_surgery: bool,
    pub recent_tattoo: bool,
    pub pregnancy: bool,
    pub high_risk_behaviour: bool,
}

impl RiskScreening {
    /// Labels of every positive answer, empty when the screen is clean.
    pub fn positive_answers(&self) -> Vec<&'static str> {
        let checks = [
            (self.recent_illness, "recent illness"),
            (self.recent_vaccination, "recent vaccination"),
            (self.recent_surgery, "recent surgery"),
            (self.recent_tattoo, "recent tattoo or piercing"),
            (self.pregnancy, "pregnancy"),
            (self.high_risk_behaviour, "high-risk behaviour"),
        ];

        checks
            .into_iter()
            .filter_map(|(positive, label)| positive.then_some(label))
            .collect()
    }
}

/// Vitals and measurements recorded at the moment of collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionVitals {
    pub hemoglobin_g_dl: f64,
    pub blood_pressure: BloodPressure,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub pulse_bpm: u32,
    /// Number of bags drawn in this sitting, normally 1.
    pub units_collected: u32,
    /// Measured collected volume, mL.
    pub volume_ml: u32,
    pub screening: RiskScreening,
}

impl CollectionVitals {
    /// Shape validation: values that are not merely disqualifying but
    /// physically impossible or unusable.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Validation` naming the first offending field.
    pub fn validate(&self) -> BankResult<()> {
        if !self.hemoglobin_g_dl.is_finite() || self.hemoglobin_g_dl <= 0.0 {
            return Err(BankError::Validation(
                "hemoglobin must be a positive number".into(),
            ));
        }
        if self.blood_pressure.systolic == 0
            || self.blood_pressure.diastolic == 0
            || self.blood_pressure.systolic <= self.blood_pressure.diastolic
        {
            return Err(BankError::Validation(format!(
                "implausible blood pressure reading {}",
                self.blood_pressure
            )));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(BankError::Validation(
                "weight must be a positive number".into(),
            ));
        }
        if !self.temperature_c.is_finite() || self.temperature_c <= 0.0 {
            return Err(BankError::Validation(
                "temperature must be a positive number".into(),
            ));
        }
        if self.units_collected == 0 {
            return Err(BankError::Validation(
                "at least one unit must be collected".into(),
            ));
        }
        if self.volume_ml == 0 {
            return Err(BankError::Validation(
                "collected volume must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Every reason this donor may not give blood today. Reasons are
    /// collected rather than short-circuited so the collector sees the
    /// full picture at once.
    pub fn deferral_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();

        if self.hemoglobin_g_dl < MIN_HEMOGLOBIN_G_DL {
            reasons.push(format!(
                "hemoglobin {} g/dL below minimum {} g/dL",
                self.hemoglobin_g_dl, MIN_HEMOGLOBIN_G_DL
            ));
        }
        if self.weight_kg < MIN_WEIGHT_KG {
            reasons.push(format!(
                "weight {} kg below minimum {} kg",
                self.weight_kg, MIN_WEIGHT_KG
            ));
        }
        if self.temperature_c > MAX_TEMPERATURE_C {
            reasons.push(format!(
                "temperature {} °C above maximum {} °C",
                self.temperature_c, MAX_TEMPERATURE_C
            ));
        }
        if self.pulse_bpm < MIN_PULSE_BPM || self.pulse_bpm > MAX_PULSE_BPM {
            reasons.push(format!(
                "pulse {} bpm outside [{}, {}] bpm",
                self.pulse_bpm, MIN_PULSE_BPM, MAX_PULSE_BPM
            ));
        }
        for answer in self.screening.positive_answers() {
            reasons.push(format!("positive screening answer: {answer}"));
        }

        reasons
    }

    /// Whether the donor meets every collection requirement.
    pub fn meets_requirements(&self) -> bool {
        self.deferral_reasons().is_empty()
    }
}
