//! Inventory: direct stock additions, quality control, expiry, listing.

use crate::blood_type::BloodType;
use crate::component::ComponentType;
use crate::config::CoreConfig;
use crate::error::{BankError, BankResult};
use crate::store::BankStore;
use crate::unit::{BloodUnit, InspectionFindings, UnitStatus};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Optional narrowing of an inventory listing. Status is matched against the
/// *effective* status, so a date-expired unit answers to EXPIRED even while
/// its stored status lags.
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryFilter {
    pub blood_type: Option<BloodType>,
    pub status: Option<UnitStatus>,
    pub expiring_within_days: Option<u32>,
}

/// Available stock for one blood type, with the slice of it that falls
/// inside the configured expiry warning window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAvailability {
    pub blood_type: BloodType,
    pub available_units: u32,
    pub expiring_soon: u32,
}

/// Persist AVAILABLE → EXPIRED for one unit when its date has passed.
/// Called by every mutating path before it does anything else to the unit,
/// so stale stored statuses can never admit expired blood.
pub(crate) fn reconcile_expired(
    store: &BankStore,
    unit_id: Uuid,
    today: NaiveDate,
) -> BankResult<()> {
    let unit = store.units.get(unit_id)?.record;
    if unit.status == UnitStatus::Available && unit.is_expired(today) {
        store.units.mutate(unit_id, |u| {
            if u.reconcile_expiry(today) {
                tracing::info!(unit_id = %unit_id, "expired unit reconciled");
            }
            Ok(())
        })?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct InventoryService {
    cfg: Arc<CoreConfig>,
    store: Arc<BankStore>,
}

impl InventoryService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<BankStore>) -> Self {
        Self { cfg, store }
    }

    /// Adds a unit straight into inventory, outside any donation. Used for
    /// stock received from another bank.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero volume, a zero expiry override, or a shelf
    /// life past the supported calendar.
    pub fn add_unit(
        &self,
        blood_type: BloodType,
        component_type: ComponentType,
        volume_ml: u32,
        collection_date: Option<NaiveDate>,
        expiry_days: Option<u32>,
    ) -> BankResult<BloodUnit> {
        if volume_ml == 0 {
            return Err(BankError::Validation("unit volume must be positive".into()));
        }
        if expiry_days == Some(0) {
            return Err(BankError::Validation(
                "expiry override must be positive".into(),
            ));
        }

        let collected = collection_date.unwrap_or_else(|| Utc::now().date_naive());
        let shelf_life = expiry_days.unwrap_or_else(|| component_type.default_shelf_life_days());
        let expiry_date = collected
            .checked_add_signed(Duration::days(i64::from(shelf_life)))
            .ok_or_else(|| {
                BankError::Validation(format!("shelf life of {shelf_life} days is out of range"))
            })?;
        let unit = BloodUnit::new(
            None,
            blood_type,
            component_type,
            volume_ml,
            collected,
            expiry_date,
        );
        self.store.units.insert(unit.id, unit.clone())?;
        tracing::info!(
            unit_number = %unit.unit_number,
            blood_type = %blood_type,
            component = %component_type,
            "unit added to inventory"
        );
        Ok(unit)
    }

    pub fn get(&self, id: Uuid) -> BankResult<BloodUnit> {
        Ok(self.store.units.get(id)?.record)
    }

    /// Lists units matching the filter, soonest expiry first.
    pub fn list(&self, filter: &InventoryFilter) -> BankResult<Vec<BloodUnit>> {
        let today = Utc::now().date_naive();
        let mut units: Vec<BloodUnit> = self
            .store
            .units
            .list()?
            .into_iter()
            .filter(|unit| {
                filter
                    .blood_type
                    .is_none_or(|wanted| unit.blood_type == wanted)
                    && filter
                        .status
                        .is_none_or(|wanted| unit.effective_status(today) == wanted)
                    && filter
                        .expiring_within_days
                        .is_none_or(|window| unit.is_expiring_soon(today, window))
            })
            .collect();
        units.sort_by(|a, b| {
            a.expiry_date
                .cmp(&b.expiry_date)
                .then_with(|| a.unit_number.as_str().cmp(b.unit_number.as_str()))
        });
        Ok(units)
    }

    /// Effective AVAILABLE stock per blood type, zeros included. The
    /// expiring-soon slice uses the configured warning window.
    pub fn summary(&self) -> BankResult<Vec<TypeAvailability>> {
        let today = Utc::now().date_naive();
        let window = self.cfg.expiry_warning_days();
        let units = self.store.units.list()?;
        Ok(BloodType::ALL
            .iter()
            .map(|&blood_type| {
                let of_type = units.iter().filter(|u| u.blood_type == blood_type);
                TypeAvailability {
                    blood_type,
                    available_units: of_type
                        .clone()
                        .filter(|u| u.effective_status(today) == UnitStatus::Available)
                        .count() as u32,
                    expiring_soon: of_type
                        .filter(|u| u.is_expiring_soon(today, window))
                        .count() as u32,
                }
            })
            .collect())
    }

    /// Runs the one-shot quality control gate on a unit.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank inspector, `AlreadyInspected` on a second
    /// inspection, `InvalidTransition` when the unit is not AVAILABLE (an
    /// expired unit is reconciled first and then refused).
    pub fn inspect(&self, unit_id: Uuid, findings: InspectionFindings) -> BankResult<BloodUnit> {
        if findings.inspected_by.trim().is_empty() {
            return Err(BankError::Validation(
                "inspector identity is required".into(),
            ));
        }

        let today = Utc::now().date_naive();
        reconcile_expired(&self.store, unit_id, today)?;

        let now = Utc::now();
        let unit = self.store.units.mutate(unit_id, |u| {
            u.inspect(findings.clone(), now)?;
            Ok(u.clone())
        })?;

        if unit.status == UnitStatus::Discarded {
            tracing::warn!(
                unit_number = %unit.unit_number,
                reason = unit.discard_reason.as_deref().unwrap_or_default(),
                "unit failed quality control and was discarded"
            );
        } else {
            tracing::info!(unit_number = %unit.unit_number, "unit passed quality control");
        }
        Ok(unit)
    }

    /// Disposes of an AVAILABLE or EXPIRED unit.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank reason, `InvalidTransition` for reserved or
    /// already-terminal units.
    pub fn discard(&self, unit_id: Uuid, reason: String) -> BankResult<BloodUnit> {
        if reason.trim().is_empty() {
            return Err(BankError::Validation("a discard reason is required".into()));
        }

        let today = Utc::now().date_naive();
        reconcile_expired(&self.store, unit_id, today)?;

        let unit = self.store.units.mutate(unit_id, |u| {
            u.discard(reason.clone())?;
            Ok(u.clone())
        })?;
        tracing::info!(unit_number = %unit.unit_number, "unit discarded");
        Ok(unit)
    }
}
