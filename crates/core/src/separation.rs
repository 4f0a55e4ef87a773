//! Component separation: one TESTED whole-blood donation becomes one or
//! more typed blood units.
//!
//! Every invariant is checked before the first unit is built, so a failure
//! leaves the donation untouched and creates nothing. Volume conservation is
//! the load-bearing check: the components can never add up to more blood
//! than was collected. Any remainder is waste, not a unit.

use crate::blood_type::BloodType;
use crate::component::ComponentType;
use crate::donation::Donation;
use crate::error::{BankError, BankResult};
use crate::unit::BloodUnit;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One requested component of a separation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub component_type: ComponentType,
    pub volume_ml: u32,
    /// Shelf life override; the component's default applies when absent.
    pub expiry_days: Option<u32>,
    pub notes: Option<String>,
}

impl ComponentSpec {
    fn shelf_life_days(&self) -> u32 {
        self.expiry_days
            .unwrap_or_else(|| self.component_type.default_shelf_life_days())
    }

    /// Expiry for a unit cut to this spec from blood collected on the given
    /// date.
    ///
    /// # Errors
    ///
    /// `Validation` when the shelf life runs past the supported calendar.
    fn expiry_on(&self, collected_on: NaiveDate) -> BankResult<NaiveDate> {
        collected_on
            .checked_add_signed(Duration::days(i64::from(self.shelf_life_days())))
            .ok_or_else(|| {
                BankError::Validation(format!(
                    "{} shelf life of {} days is out of range",
                    self.component_type,
                    self.shelf_life_days()
                ))
            })
    }
}

fn validate_specs(specs: &[ComponentSpec]) -> BankResult<()> {
    if specs.is_empty() {
        return Err(BankError::Validation(
            "at least one component must be requested".into(),
        ));
    }
    for spec in specs {
        if spec.volume_ml == 0 {
            return Err(BankError::Validation(format!(
                "{} component volume must be positive",
                spec.component_type
            )));
        }
        if spec.expiry_days == Some(0) {
            return Err(BankError::Validation(format!(
                "{} expiry override must be positive",
                spec.component_type
            )));
        }
    }
    Ok(())
}

/// Split a TESTED donation into the requested components.
///
/// On success the donation is PROCESSED and one AVAILABLE unit per spec is
/// returned, each carrying the donor's blood type, the donation's collection
/// date, and an expiry of collection date plus the component shelf life.
///
/// # Errors
///
/// `InvalidTransition` unless the donation is TESTED, `Validation` for a
/// malformed spec list or a shelf life past the supported calendar, and
/// `VolumeExceeded` when the components total more than the collected
/// volume. No unit exists after any error.
pub fn separate_components(
    donation: &mut Donation,
    donor_blood_type: BloodType,
    specs: &[ComponentSpec],
) -> BankResult<Vec<BloodUnit>> {
    validate_specs(specs)?;

    let record = donation.collection_record()?;
    let collected_on = record.collected_on;
    let available_ml = record.vitals.volume_ml;

    // Totalled in u64 so the conservation check sees the true sum, not a
    // wrapped one.
    let requested_ml: u64 = specs.iter().map(|s| u64::from(s.volume_ml)).sum();
    if requested_ml > u64::from(available_ml) {
        return Err(BankError::VolumeExceeded {
            requested_ml,
            available_ml,
        });
    }

    let expiry_dates = specs
        .iter()
        .map(|spec| spec.expiry_on(collected_on))
        .collect::<BankResult<Vec<_>>>()?;

    // Transition legality is enforced here; only now may units exist.
    donation.mark_processed()?;

    let units = specs
        .iter()
        .zip(expiry_dates)
        .map(|(spec, expiry_date)| {
            BloodUnit::new(
                Some(donation.id),
                donor_blood_type,
                spec.component_type,
                spec.volume_ml,
                collected_on,
                expiry_date,
            )
        })
        .collect();

    Ok(units)
}
