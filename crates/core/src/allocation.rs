//! Candidate selection for blood requests.
//!
//! Selection is pure: given an inventory snapshot it decides *which* units a
//! request should take, in order. Exact blood-type matches are taken before
//! cross-compatible ones so that universal-donor stock survives for the
//! patients who have no alternative. Within a tier the soonest expiry goes
//! first (first-expire-first-out) to minimise wastage, with the unit number
//! as a deterministic tie-break. Actually reserving the chosen units is the
//! requests service's job.

use crate::blood_type::BloodType;
use crate::unit::{BloodUnit, UnitStatus};
use chrono::NaiveDate;
use uuid::Uuid;

/// What one allocation pass decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// Enough stock: the unit ids to reserve, in reservation order.
    Selected(Vec<Uuid>),
    /// Not enough compatible stock. Nothing may be reserved.
    Shortfall { requested: u32, matched: u32 },
}

fn is_candidate(
    unit: &BloodUnit,
    recipient: BloodType,
    today: NaiveDate,
    qc_required: bool,
) -> bool {
    unit.status == UnitStatus::Available
        && !unit.is_expired(today)
        && unit.qc_admitted(qc_required)
        && unit.blood_type.can_donate_to(recipient)
}

/// Choose `quantity` units for a recipient of the given blood type.
///
/// The snapshot is filtered to AVAILABLE, unexpired, quality-admitted,
/// compatible units and ranked exact-match first, then by expiry date,
/// then by unit number.
pub fn select_units(
    inventory: &[BloodUnit],
    recipient: BloodType,
    quantity: u32,
    today: NaiveDate,
    qc_required: bool,
) -> AllocationOutcome {
    let mut candidates: Vec<&BloodUnit> = inventory
        .iter()
        .filter(|unit| is_candidate(unit, recipient, today, qc_required))
        .collect();

    let matched = candidates.len() as u32;
    if matched < quantity {
        return AllocationOutcome::Shortfall {
            requested: quantity,
            matched,
        };
    }

    candidates.sort_by(|a, b| {
        let tier = |u: &BloodUnit| u32::from(u.blood_type != recipient);
        tier(a)
            .cmp(&tier(b))
            .then(a.expiry_date.cmp(&b.expiry_date))
            .then_with(|| a.unit_number.as_str().cmp(b.unit_number.as_str()))
    });

    AllocationOutcome::Selected(
        candidates
            .into_iter()
            .take(quantity as usize)
            .map(|unit| unit.id)
            .collect(),
    )
}
