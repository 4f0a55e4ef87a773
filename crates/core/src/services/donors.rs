//! Donor registration and eligibility checks.

use crate::blood_type::BloodType;
use crate::config::CoreConfig;
use crate::donor::{Donor, Eligibility};
use crate::error::{BankError, BankResult};
use crate::store::BankStore;
use bloodbank_types::NonEmptyText;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct DonorService {
    cfg: Arc<CoreConfig>,
    store: Arc<BankStore>,
}

impl DonorService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<BankStore>) -> Self {
        Self { cfg, store }
    }

    /// Registers a donor and returns the stored record.
    ///
    /// # Errors
    ///
    /// `Validation` when the weight is not a positive number.
    pub fn register(
        &self,
        name: NonEmptyText,
        blood_type: BloodType,
        weight_kg: f64,
        contact: Option<String>,
    ) -> BankResult<Donor> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(BankError::Validation(
                "donor weight must be a positive number".into(),
            ));
        }
        let donor = Donor::new(name, blood_type, weight_kg, contact);
        self.store.donors.insert(donor.id, donor.clone())?;
        tracing::info!(donor_id = %donor.id, blood_type = %donor.blood_type, "donor registered");
        Ok(donor)
    }

    pub fn get(&self, id: Uuid) -> BankResult<Donor> {
        Ok(self.store.donors.get(id)?.record)
    }

    pub fn list(&self) -> BankResult<Vec<Donor>> {
        let mut donors = self.store.donors.list()?;
        donors.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        Ok(donors)
    }

    /// Evaluates whether the donor may schedule a donation today.
    ///
    /// # Errors
    ///
    /// `NotFound` when the donor does not exist.
    pub fn eligibility(&self, id: Uuid) -> BankResult<Eligibility> {
        let donor = self.get(id)?;
        let today = Utc::now().date_naive();
        Ok(donor.can_schedule(today, self.cfg.donation_interval_days()))
    }
}
