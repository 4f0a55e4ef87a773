//! Donation lifecycle orchestration.
//!
//! Every transition follows the same shape: snapshot the versioned record,
//! run the pure state machine on a clone, then commit with compare-and-set
//! against the version read at the start. A record that moved underneath the
//! operation fails `ConcurrentModification` and nothing is written, so two
//! collectors can never both claim the same donation.

use crate::config::CoreConfig;
use crate::donation::{Donation, DonationStatus, TestResults};
use crate::error::{BankError, BankResult};
use crate::separation::{separate_components, ComponentSpec};
use crate::store::BankStore;
use crate::unit::BloodUnit;
use crate::vitals::CollectionVitals;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct DonationService {
    cfg: Arc<CoreConfig>,
    store: Arc<BankStore>,
}

impl DonationService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<BankStore>) -> Self {
        Self { cfg, store }
    }

    /// Books an appointment for an eligible donor.
    ///
    /// # Errors
    ///
    /// `NotFound` when the donor does not exist; `DonorDeferred` when the
    /// minimum interval since their last donation has not elapsed.
    pub fn schedule(
        &self,
        donor_id: Uuid,
        scheduled_date: NaiveDate,
        notes: Option<String>,
    ) -> BankResult<Donation> {
        let donor = self.store.donors.get(donor_id)?.record;
        let today = Utc::now().date_naive();
        if let crate::donor::Eligibility::Deferred { until, .. } =
            donor.can_schedule(today, self.cfg.donation_interval_days())
        {
            return Err(BankError::DonorDeferred { until });
        }

        let donation = Donation::schedule(donor_id, scheduled_date, notes);
        self.store.donations.insert(donation.id, donation.clone())?;
        tracing::info!(donation_id = %donation.id, donor_id = %donor_id, "donation scheduled");
        Ok(donation)
    }

    pub fn get(&self, id: Uuid) -> BankResult<Donation> {
        Ok(self.store.donations.get(id)?.record)
    }

    pub fn list(&self) -> BankResult<Vec<Donation>> {
        let mut donations = self.store.donations.list()?;
        donations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(donations)
    }

    /// Records collection vitals and moves the donation to COLLECTED.
    ///
    /// # Errors
    ///
    /// `IneligibleDonor` when vitals or screening disqualify the donor (the
    /// record stays SCHEDULED so it can be cancelled), `InvalidTransition`
    /// from any state but SCHEDULED, `ConcurrentModification` on a lost race.
    pub fn collect(&self, donation_id: Uuid, vitals: CollectionVitals) -> BankResult<Donation> {
        let row = self.store.donations.get(donation_id)?;
        let mut donation = row.record;
        donation.collect(vitals, Utc::now().date_naive())?;
        self.store
            .donations
            .commit(donation_id, row.version, donation.clone())?;
        tracing::info!(donation_id = %donation_id, "donation collected");
        Ok(donation)
    }

    /// Records laboratory results; an infection marker rejects the donation.
    ///
    /// # Errors
    ///
    /// `InvalidTestValue` for an implausible hemoglobin, `InvalidTransition`
    /// from any state but COLLECTED, `ConcurrentModification` on a lost race.
    pub fn record_test_results(
        &self,
        donation_id: Uuid,
        results: TestResults,
    ) -> BankResult<Donation> {
        let row = self.store.donations.get(donation_id)?;
        let mut donation = row.record;
        donation.record_test_results(results)?;
        self.store
            .donations
            .commit(donation_id, row.version, donation.clone())?;

        if donation.status == DonationStatus::Rejected {
            tracing::warn!(
                donation_id = %donation_id,
                donor_id = %donation.donor_id,
                "donation rejected by infectious disease screening"
            );
        } else {
            tracing::info!(donation_id = %donation_id, "donation tested clean");
        }
        Ok(donation)
    }

    /// Cancels a SCHEDULED appointment. The donor's eligibility is untouched.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` once collected, `ConcurrentModification` on a
    /// lost race.
    pub fn cancel(&self, donation_id: Uuid, reason: String) -> BankResult<Donation> {
        let row = self.store.donations.get(donation_id)?;
        let mut donation = row.record;
        donation.cancel(reason)?;
        self.store
            .donations
            .commit(donation_id, row.version, donation.clone())?;
        tracing::info!(donation_id = %donation_id, "donation cancelled");
        Ok(donation)
    }

    /// Separates a TESTED donation into typed units.
    ///
    /// The donation's CAS commit to PROCESSED is the linearisation point:
    /// units are inserted only after it succeeds, so a failed commit leaves
    /// no units behind. The donor's `last_donation_date` is set to the
    /// collection date in the same pass, which pushes their derived
    /// eligibility date forward.
    ///
    /// # Errors
    ///
    /// `VolumeExceeded` when the components total more than the collected
    /// volume (nothing is created), `Validation` for a malformed spec list,
    /// `InvalidTransition` unless TESTED, `ConcurrentModification` on a
    /// lost race.
    pub fn separate(&self, donation_id: Uuid, specs: &[ComponentSpec]) -> BankResult<Vec<BloodUnit>> {
        let row = self.store.donations.get(donation_id)?;
        let mut donation = row.record;
        let donor = self.store.donors.get(donation.donor_id)?.record;

        let units = separate_components(&mut donation, donor.blood_type, specs)?;
        let collected_on = donation.collection_record()?.collected_on;

        self.store
            .donations
            .commit(donation_id, row.version, donation)?;
        for unit in &units {
            self.store.units.insert(unit.id, unit.clone())?;
        }
        self.store.donors.mutate(donor.id, |d| {
            d.last_donation_date = Some(collected_on);
            Ok(())
        })?;

        tracing::info!(
            donation_id = %donation_id,
            units = units.len(),
            "donation separated into components"
        );
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blood_type::BloodType;
    use crate::component::ComponentType;
    use crate::donor::Donor;
    use crate::vitals::{BloodPressure, RiskScreening};
    use bloodbank_types::NonEmptyText;
    use chrono::Duration;

    fn service() -> DonationService {
        DonationService::new(Arc::new(CoreConfig::standard()), Arc::new(BankStore::new()))
    }

    fn seeded_donor(service: &DonationService, blood_type: BloodType) -> Donor {
        let donor = Donor::new(
            NonEmptyText::new("Marta Keller").expect("valid"),
            blood_type,
            70.0,
            None,
        );
        service
            .store
            .donors
            .insert(donor.id, donor.clone())
            .expect("seed donor");
        donor
    }

    fn passing_vitals() -> CollectionVitals {
        CollectionVitals {
            hemoglobin_g_dl: 13.0,
            blood_pressure: BloodPressure {
                systolic: 120,
                diastolic: 80,
            },
            weight_kg: 60.0,
            temperature_c: 36.8,
            pulse_bpm: 70,
            units_collected: 1,
            volume_ml: 450,
            screening: RiskScreening::default(),
        }
    }

    fn clean_results() -> TestResults {
        TestResults {
            hiv: false,
            hepatitis_b: false,
            hepatitis_c: false,
            syphilis: false,
            malaria: false,
            hemoglobin_g_dl: 13.2,
            notes: None,
        }
    }

    fn tested_donation(service: &DonationService, donor_id: Uuid) -> Donation {
        let donation = service
            .schedule(donor_id, Utc::now().date_naive(), None)
            .expect("schedule");
        service
            .collect(donation.id, passing_vitals())
            .expect("collect");
        service
            .record_test_results(donation.id, clean_results())
            .expect("tests")
    }

    #[test]
    fn full_happy_path_reaches_processed_and_updates_the_donor() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::APositive);
        let donation = tested_donation(&service, donor.id);

        let units = service
            .separate(
                donation.id,
                &[
                    ComponentSpec {
                        component_type: ComponentType::RedCells,
                        volume_ml: 250,
                        expiry_days: None,
                        notes: None,
                    },
                    ComponentSpec {
                        component_type: ComponentType::Plasma,
                        volume_ml: 200,
                        expiry_days: None,
                        notes: None,
                    },
                ],
            )
            .expect("separate");

        assert_eq!(units.len(), 2);
        let stored = service.get(donation.id).expect("get");
        assert_eq!(stored.status, DonationStatus::Processed);

        let today = Utc::now().date_naive();
        let donor = service.store.donors.get(donor.id).expect("donor").record;
        assert_eq!(donor.last_donation_date, Some(today));

        // Units are stored and linked back to the donation.
        for unit in &units {
            let stored = service.store.units.get(unit.id).expect("unit").record;
            assert_eq!(stored.donation_id, Some(donation.id));
            assert_eq!(stored.blood_type, BloodType::APositive);
        }
    }

    #[test]
    fn a_deferred_donor_cannot_schedule() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::ONegative);
        let today = Utc::now().date_naive();
        service
            .store
            .donors
            .mutate(donor.id, |d| {
                d.last_donation_date = Some(today - Duration::days(5));
                Ok(())
            })
            .expect("seed last donation");

        let err = service
            .schedule(donor.id, today + Duration::days(1), None)
            .expect_err("deferred donor");
        match err {
            BankError::DonorDeferred { until } => {
                assert_eq!(until, today + Duration::days(51));
            }
            other => panic!("expected DonorDeferred, got {other:?}"),
        }
    }

    #[test]
    fn failed_vitals_leave_the_donation_scheduled_for_cancellation() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::BNegative);
        let donation = service
            .schedule(donor.id, Utc::now().date_naive(), None)
            .expect("schedule");

        let err = service
            .collect(
                donation.id,
                CollectionVitals {
                    temperature_c: 38.4,
                    ..passing_vitals()
                },
            )
            .expect_err("fever blocks collection");
        assert!(matches!(err, BankError::IneligibleDonor { .. }));

        // Still SCHEDULED, so cancelling is the legal follow-up.
        let cancelled = service
            .cancel(donation.id, "donor febrile at appointment".to_string())
            .expect("cancel");
        assert_eq!(cancelled.status, DonationStatus::Cancelled);
        // The donor's eligibility is untouched by the failed visit.
        let donor = service.store.donors.get(donor.id).expect("donor").record;
        assert_eq!(donor.last_donation_date, None);
    }

    #[test]
    fn infected_donation_is_rejected_and_never_separable() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::AbPositive);
        let donation = service
            .schedule(donor.id, Utc::now().date_naive(), None)
            .expect("schedule");
        service
            .collect(donation.id, passing_vitals())
            .expect("collect");

        let rejected = service
            .record_test_results(
                donation.id,
                TestResults {
                    syphilis: true,
                    ..clean_results()
                },
            )
            .expect("results recorded");
        assert_eq!(rejected.status, DonationStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Failed infectious disease screening")
        );

        let err = service
            .separate(
                donation.id,
                &[ComponentSpec {
                    component_type: ComponentType::WholeBlood,
                    volume_ml: 450,
                    expiry_days: None,
                    notes: None,
                }],
            )
            .expect_err("rejected blood is never processed");
        assert!(matches!(err, BankError::InvalidTransition { .. }));
        assert!(service.store.units.list().expect("units").is_empty());
    }

    #[test]
    fn volume_conservation_is_atomic() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::OPositive);
        let donation = tested_donation(&service, donor.id);

        let err = service
            .separate(
                donation.id,
                &[
                    ComponentSpec {
                        component_type: ComponentType::RedCells,
                        volume_ml: 300,
                        expiry_days: None,
                        notes: None,
                    },
                    ComponentSpec {
                        component_type: ComponentType::Plasma,
                        volume_ml: 300,
                        expiry_days: None,
                        notes: None,
                    },
                ],
            )
            .expect_err("600 mL out of 450 mL");
        assert!(matches!(err, BankError::VolumeExceeded { .. }));

        // No units, donation still TESTED, donor untouched.
        assert!(service.store.units.list().expect("units").is_empty());
        assert_eq!(
            service.get(donation.id).expect("get").status,
            DonationStatus::Tested
        );
        let donor = service.store.donors.get(donor.id).expect("donor").record;
        assert_eq!(donor.last_donation_date, None);
    }

    #[test]
    fn a_stale_writer_loses_the_race() {
        let service = service();
        let donor = seeded_donor(&service, BloodType::ANegative);
        let donation = service
            .schedule(donor.id, Utc::now().date_naive(), None)
            .expect("schedule");

        // Another actor cancels between our snapshot and commit.
        let row = service.store.donations.get(donation.id).expect("snapshot");
        service
            .cancel(donation.id, "double booked".to_string())
            .expect("cancel wins");

        let mut stale = row.record;
        stale
            .collect(passing_vitals(), Utc::now().date_naive())
            .expect("pure transition on the stale clone succeeds");
        let err = service
            .store
            .donations
            .commit(donation.id, row.version, stale)
            .expect_err("stale version must not commit");
        assert!(matches!(err, BankError::ConcurrentModification));

        assert_eq!(
            service.get(donation.id).expect("get").status,
            DonationStatus::Cancelled
        );
    }
}
