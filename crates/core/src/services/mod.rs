//! Orchestration services over the versioned store.
//!
//! Each service owns one slice of the bank's behaviour: donor registration
//! and eligibility, the donation lifecycle, inventory and quality control,
//! and request allocation. Services are cheap to clone and share the same
//! [`crate::store::BankStore`] and [`crate::config::CoreConfig`] behind
//! `Arc`s.

pub mod donations;
pub mod donors;
pub mod inventory;
pub mod requests;

pub use donations::DonationService;
pub use donors::DonorService;
pub use inventory::{InventoryFilter, InventoryService, TypeAvailability};
pub use requests::{ApprovalOutcome, QueueReport, RequestService};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blood_type::BloodType;
    use crate::component::ComponentType;
    use crate::config::CoreConfig;
    use crate::donation::TestResults;
    use crate::request::{RequestPriority, RequestStatus};
    use crate::separation::ComponentSpec;
    use crate::store::BankStore;
    use crate::transfusion::TransfusionStatus;
    use crate::unit::{InspectionFindings, UnitStatus};
    use crate::vitals::{BloodPressure, CollectionVitals, RiskScreening};
    use bloodbank_types::NonEmptyText;
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    struct Bank {
        donors: DonorService,
        donations: DonationService,
        inventory: InventoryService,
        requests: RequestService,
    }

    fn bank() -> Bank {
        let cfg = Arc::new(CoreConfig::standard());
        let store = Arc::new(BankStore::new());
        Bank {
            donors: DonorService::new(cfg.clone(), store.clone()),
            donations: DonationService::new(cfg.clone(), store.clone()),
            inventory: InventoryService::new(cfg.clone(), store.clone()),
            requests: RequestService::new(cfg, store),
        }
    }

    /// The whole pipeline in one sitting: a donor gives blood, the blood is
    /// screened, separated, quality-checked, requested, reserved, and
    /// finally transfused.
    #[test]
    fn blood_flows_from_donor_arm_to_patient() {
        let bank = bank();
        let today = Utc::now().date_naive();

        let donor = bank
            .donors
            .register(
                NonEmptyText::new("Tomas Vargas").expect("valid"),
                BloodType::ONegative,
                82.0,
                None,
            )
            .expect("register");

        let donation = bank
            .donations
            .schedule(donor.id, today, Some("walk-in".to_string()))
            .expect("schedule");
        bank.donations
            .collect(
                donation.id,
                CollectionVitals {
                    hemoglobin_g_dl: 14.1,
                    blood_pressure: BloodPressure {
                        systolic: 118,
                        diastolic: 76,
                    },
                    weight_kg: 82.0,
                    temperature_c: 36.6,
                    pulse_bpm: 64,
                    units_collected: 1,
                    volume_ml: 450,
                    screening: RiskScreening::default(),
                },
            )
            .expect("collect");
        bank.donations
            .record_test_results(
                donation.id,
                TestResults {
                    hiv: false,
                    hepatitis_b: false,
                    hepatitis_c: false,
                    syphilis: false,
                    malaria: false,
                    hemoglobin_g_dl: 14.0,
                    notes: None,
                },
            )
            .expect("screen");

        let units = bank
            .donations
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
                        volume_ml: 180,
                        expiry_days: None,
                        notes: None,
                    },
                ],
            )
            .expect("separate");

        for unit in &units {
            bank.inventory
                .inspect(
                    unit.id,
                    InspectionFindings {
                        appearance_ok: true,
                        storage_temp_ok: true,
                        packaging_ok: true,
                        labeling_ok: true,
                        passed: true,
                        notes: None,
                        inspected_by: "qc-tech-1".to_string(),
                    },
                )
                .expect("inspect");
        }

        // An AB+ patient can receive the O- red cells.
        let request = bank
            .requests
            .submit(
                Uuid::new_v4(),
                BloodType::AbPositive,
                2,
                RequestPriority::Urgent,
                NonEmptyText::new("dr-hale").expect("valid"),
                NonEmptyText::new("post-operative anaemia").expect("valid"),
            )
            .expect("submit");
        match bank.requests.approve(request.id, None).expect("approve") {
            ApprovalOutcome::Approved { reserved_units, .. } => {
                assert_eq!(reserved_units.len(), 2)
            }
            ApprovalOutcome::Shortfall { .. } => panic!("both units are compatible"),
        }

        let transfusion = bank
            .requests
            .complete_transfusion(request.id, NonEmptyText::new("nurse-ito").expect("valid"))
            .expect("transfuse");
        assert_eq!(transfusion.status, TransfusionStatus::Completed);

        // End state: request fulfilled, all units consumed, donor deferred.
        assert_eq!(
            bank.requests.get(request.id).expect("request").status,
            RequestStatus::Fulfilled
        );
        for unit in &units {
            assert_eq!(
                bank.inventory.get(unit.id).expect("unit").status,
                UnitStatus::Used
            );
        }
        assert!(!bank
            .donors
            .eligibility(donor.id)
            .expect("eligibility")
            .is_eligible());
    }
}
