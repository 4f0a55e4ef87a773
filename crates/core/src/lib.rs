//! # Blood Bank Core
//!
//! Core business logic for the hospital blood bank:
//! - Donor registration and derived donation eligibility
//! - The donation lifecycle state machine (scheduling, collection,
//!   laboratory screening, component separation)
//! - Inventory with computed expiry, lazy reconciliation, and a one-shot
//!   quality control gate
//! - ABO/Rh compatibility and first-expire-first-out allocation of units
//!   to clinical requests, through to transfusion
//!
//! State lives in a versioned in-memory store with optimistic concurrency;
//! every mutation commits by compare-and-set.
//!
//! **No API concerns**: HTTP servers, wire formats, and service interfaces
//! belong in `api-rest`.

pub mod allocation;
pub mod blood_type;
pub mod component;
pub mod config;
pub mod constants;
pub mod donation;
pub mod donor;
pub mod error;
pub mod request;
pub mod separation;
pub mod services;
pub mod store;
pub mod transfusion;
pub mod unit;
pub mod vitals;

pub use allocation::AllocationOutcome;
pub use blood_type::BloodType;
pub use component::ComponentType;
pub use config::CoreConfig;
pub use donation::{CollectionRecord, Donation, DonationStatus, TestResults};
pub use donor::{Donor, Eligibility};
pub use error::{BankError, BankResult};
pub use request::{BloodRequest, RequestPriority, RequestStatus};
pub use separation::ComponentSpec;
pub use services::{
    ApprovalOutcome, DonationService, DonorService, InventoryFilter, InventoryService,
    QueueReport, RequestService, TypeAvailability,
};
pub use store::BankStore;
pub use transfusion::{Transfusion, TransfusionStatus};
pub use unit::{BloodUnit, InspectionFindings, QualityControlRecord, Reservation, UnitStatus};
pub use vitals::{BloodPressure, CollectionVitals, RiskScreening};
