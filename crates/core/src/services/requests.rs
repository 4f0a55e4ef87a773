//! Request intake, allocation, and transfusion finalisation.
//!
//! Reserving blood for a request is a small saga: the chosen units are
//! reserved one at a time (each a test-and-set under the unit table's
//! lock), and a unit lost to a concurrent writer triggers a compensating
//! release of everything reserved so far, one fresh re-selection, and only
//! then a `ConcurrentModification` failure. The request's own PENDING →
//! APPROVED commit is compare-and-set against the version read when the
//! operation began, so a request that was rejected mid-allocation can never
//! end up approved.

use crate::allocation::{select_units, AllocationOutcome};
use crate::blood_type::BloodType;
use crate::config::CoreConfig;
use crate::constants::ALLOCATION_RETRIES;
use crate::error::{BankError, BankResult};
use crate::request::{BloodRequest, RequestPriority, RequestStatus};
use crate::services::inventory::reconcile_expired;
use crate::store::BankStore;
use crate::transfusion::{Transfusion, TransfusionStatus};
use crate::unit::{BloodUnit, UnitStatus};
use bloodbank_types::NonEmptyText;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// What approving a request produced.
#[derive(Clone, Debug)]
pub enum ApprovalOutcome {
    /// Every requested unit was reserved and the request is APPROVED.
    Approved {
        request: BloodRequest,
        reserved_units: Vec<BloodUnit>,
    },
    /// Not enough compatible stock. Nothing was reserved and the request
    /// stays PENDING so a later pass can try again.
    Shortfall {
        request: BloodRequest,
        requested: u32,
        matched: u32,
    },
}

/// Outcome of one pass over the pending queue.
#[derive(Clone, Debug, Default)]
pub struct QueueReport {
    pub approved: Vec<Uuid>,
    pub shortfalls: Vec<Uuid>,
    /// Requests that changed state under the pass and were left alone.
    pub skipped: Vec<Uuid>,
}

#[derive(Clone)]
pub struct RequestService {
    cfg: Arc<CoreConfig>,
    store: Arc<BankStore>,
}

impl RequestService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<BankStore>) -> Self {
        Self { cfg, store }
    }

    /// Files a PENDING request for compatible blood.
    ///
    /// # Errors
    ///
    /// `Validation` when the quantity is zero.
    pub fn submit(
        &self,
        patient_id: Uuid,
        blood_type: BloodType,
        quantity: u32,
        priority: RequestPriority,
        requested_by: NonEmptyText,
        reason: NonEmptyText,
    ) -> BankResult<BloodRequest> {
        let request =
            BloodRequest::submit(patient_id, blood_type, quantity, priority, requested_by, reason)?;
        self.store.requests.insert(request.id, request.clone())?;
        tracing::info!(
            request_id = %request.id,
            blood_type = %blood_type,
            quantity,
            priority = %priority,
            "blood request submitted"
        );
        Ok(request)
    }

    pub fn get(&self, id: Uuid) -> BankResult<BloodRequest> {
        Ok(self.store.requests.get(id)?.record)
    }

    pub fn list(&self) -> BankResult<Vec<BloodRequest>> {
        let mut requests = self.store.requests.list()?;
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(requests)
    }

    /// Attempts to reserve stock for a PENDING request and approve it.
    ///
    /// All-or-nothing: on success every selected unit is RESERVED and the
    /// request APPROVED; on shortfall nothing at all has changed. A lost
    /// race against another writer is retried once with a fresh selection
    /// before giving up.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is PENDING;
    /// `ConcurrentModification` when the retry also loses its race, or when
    /// the request itself changed mid-allocation (its units are released).
    pub fn approve(
        &self,
        request_id: Uuid,
        approved_by: Option<NonEmptyText>,
    ) -> BankResult<ApprovalOutcome> {
        let row = self.store.requests.get(request_id)?;
        if row.record.status != RequestStatus::Pending {
            return Err(BankError::InvalidTransition {
                entity: "request",
                current: row.record.status.to_string(),
                action: "approve",
            });
        }

        let today = Utc::now().date_naive();
        let qc_required = self.cfg.qc_required();

        for attempt in 0..=ALLOCATION_RETRIES {
            let inventory = self.store.units.list()?;
            let selected = match select_units(
                &inventory,
                row.record.blood_type,
                row.record.quantity,
                today,
                qc_required,
            ) {
                AllocationOutcome::Shortfall { requested, matched } => {
                    tracing::warn!(
                        request_id = %request_id,
                        requested,
                        matched,
                        "allocation shortfall; request left pending"
                    );
                    return Ok(ApprovalOutcome::Shortfall {
                        request: row.record,
                        requested,
                        matched,
                    });
                }
                AllocationOutcome::Selected(ids) => ids,
            };

            let Some(reserved) = self.try_reserve(&selected, request_id, today)? else {
                tracing::warn!(
                    request_id = %request_id,
                    attempt,
                    "unit reservation raced; reselecting"
                );
                continue;
            };

            let mut request = row.record.clone();
            request.approve(approved_by)?;
            return match self.store.requests.commit(request_id, row.version, request.clone()) {
                Ok(_) => {
                    tracing::info!(
                        request_id = %request_id,
                        units = reserved.len(),
                        "request approved with reserved units"
                    );
                    Ok(ApprovalOutcome::Approved {
                        request,
                        reserved_units: reserved,
                    })
                }
                Err(err) => {
                    // The request moved underneath us; give its blood back.
                    self.release_units(reserved.iter().map(|u| u.id));
                    Err(err)
                }
            };
        }

        Err(BankError::ConcurrentModification)
    }

    /// Rejects a PENDING or APPROVED request, releasing any blood it holds
    /// and cancelling any transfusion still scheduled against it.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank reason, `InvalidTransition` once FULFILLED
    /// or already REJECTED, `ConcurrentModification` on a lost race.
    pub fn reject(&self, request_id: Uuid, reason: String) -> BankResult<BloodRequest> {
        if reason.trim().is_empty() {
            return Err(BankError::Validation(
                "a rejection reason is required".into(),
            ));
        }

        let row = self.store.requests.get(request_id)?;
        let mut request = row.record;
        request.reject(reason)?;
        self.store
            .requests
            .commit(request_id, row.version, request.clone())?;

        for transfusion in self.store.transfusions.list()? {
            if transfusion.request_id == request_id
                && transfusion.status == TransfusionStatus::Scheduled
            {
                if let Err(err) = self.store.transfusions.mutate(transfusion.id, |t| t.cancel()) {
                    tracing::error!(
                        transfusion_id = %transfusion.id,
                        %err,
                        "failed to cancel transfusion of rejected request"
                    );
                }
            }
        }

        let held = self.reserved_unit_ids(request_id)?;
        let released = held.len();
        self.release_units(held.into_iter());
        tracing::info!(request_id = %request_id, released, "request rejected");
        Ok(request)
    }

    /// Runs allocation over every PENDING request, most urgent first and
    /// oldest first within a priority. Shortfall requests stay PENDING and
    /// are reported, not failed.
    ///
    /// # Errors
    ///
    /// Only storage failures; individual requests that race are skipped.
    pub fn process_pending(&self) -> BankResult<QueueReport> {
        let mut pending: Vec<BloodRequest> = self
            .store
            .requests
            .list()?
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        let mut report = QueueReport::default();
        for request in pending {
            match self.approve(request.id, None) {
                Ok(ApprovalOutcome::Approved { .. }) => report.approved.push(request.id),
                Ok(ApprovalOutcome::Shortfall { .. }) => report.shortfalls.push(request.id),
                Err(BankError::ConcurrentModification | BankError::InvalidTransition { .. }) => {
                    tracing::warn!(request_id = %request.id, "request skipped during queue pass");
                    report.skipped.push(request.id);
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(
            approved = report.approved.len(),
            shortfalls = report.shortfalls.len(),
            skipped = report.skipped.len(),
            "pending queue processed"
        );
        Ok(report)
    }

    /// Plans a transfusion for an APPROVED request. Its units stay RESERVED.
    ///
    /// # Errors
    ///
    /// `Validation` for a past date, `InvalidTransition` unless the request
    /// is APPROVED with no transfusion already scheduled.
    pub fn schedule_transfusion(
        &self,
        request_id: Uuid,
        scheduled_for: NaiveDate,
    ) -> BankResult<Transfusion> {
        if scheduled_for < Utc::now().date_naive() {
            return Err(BankError::Validation(
                "a transfusion cannot be scheduled in the past".into(),
            ));
        }

        let request = self.store.requests.get(request_id)?.record;
        if request.status != RequestStatus::Approved {
            return Err(BankError::InvalidTransition {
                entity: "request",
                current: request.status.to_string(),
                action: "schedule a transfusion",
            });
        }
        if self.scheduled_transfusion_of(request_id)?.is_some() {
            return Err(BankError::InvalidTransition {
                entity: "request",
                current: request.status.to_string(),
                action: "schedule a second transfusion",
            });
        }

        let unit_ids = self.reserved_unit_ids(request_id)?;
        let transfusion =
            Transfusion::schedule(request_id, request.patient_id, unit_ids, scheduled_for);
        self.store
            .transfusions
            .insert(transfusion.id, transfusion.clone())?;
        tracing::info!(
            request_id = %request_id,
            transfusion_id = %transfusion.id,
            "transfusion scheduled"
        );
        Ok(transfusion)
    }

    /// Finalises an APPROVED request: the request becomes FULFILLED, its
    /// reserved units USED (terminal), and the transfusion COMPLETED. The
    /// request's commit is the linearisation point; a second completion
    /// fails there before any unit is touched.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is APPROVED,
    /// `ConcurrentModification` on a lost race.
    pub fn complete_transfusion(
        &self,
        request_id: Uuid,
        performed_by: NonEmptyText,
    ) -> BankResult<Transfusion> {
        let row = self.store.requests.get(request_id)?;
        let mut request = row.record;
        let unit_ids = self.reserved_unit_ids(request_id)?;

        request.fulfil()?;
        self.store
            .requests
            .commit(request_id, row.version, request.clone())?;

        for &unit_id in &unit_ids {
            if let Err(err) = self.store.units.mutate(unit_id, |u| u.mark_used()) {
                tracing::error!(unit_id = %unit_id, %err, "failed to mark reserved unit used");
            }
        }

        let today = Utc::now().date_naive();
        let transfusion = match self.scheduled_transfusion_of(request_id)? {
            Some(scheduled) => self.store.transfusions.mutate(scheduled.id, |t| {
                t.complete(performed_by.clone(), today)?;
                Ok(t.clone())
            })?,
            None => {
                let transfusion = Transfusion::performed(
                    request_id,
                    request.patient_id,
                    unit_ids.clone(),
                    performed_by,
                    today,
                );
                self.store
                    .transfusions
                    .insert(transfusion.id, transfusion.clone())?;
                transfusion
            }
        };

        tracing::info!(
            request_id = %request_id,
            units = unit_ids.len(),
            "transfusion completed"
        );
        Ok(transfusion)
    }

    /// Calls off a SCHEDULED transfusion. The request stays APPROVED and
    /// keeps its reserved blood; releasing it means rejecting the request.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` once completed or cancelled.
    pub fn cancel_transfusion(&self, transfusion_id: Uuid) -> BankResult<Transfusion> {
        let transfusion = self.store.transfusions.mutate(transfusion_id, |t| {
            t.cancel()?;
            Ok(t.clone())
        })?;
        tracing::info!(transfusion_id = %transfusion_id, "scheduled transfusion cancelled");
        Ok(transfusion)
    }

    /// Reserves every listed unit for the request, in order. `None` means a
    /// unit was lost to a concurrent writer and everything already reserved
    /// here has been released again.
    fn try_reserve(
        &self,
        unit_ids: &[Uuid],
        request_id: Uuid,
        today: NaiveDate,
    ) -> BankResult<Option<Vec<BloodUnit>>> {
        let now = Utc::now();
        let mut reserved: Vec<BloodUnit> = Vec::with_capacity(unit_ids.len());
        for &unit_id in unit_ids {
            reconcile_expired(&self.store, unit_id, today)?;
            let result = self.store.units.mutate(unit_id, |u| {
                u.reserve(request_id, now)?;
                Ok(u.clone())
            });
            match result {
                Ok(unit) => reserved.push(unit),
                Err(BankError::InvalidTransition { .. }) => {
                    self.release_units(reserved.iter().map(|u| u.id));
                    return Ok(None);
                }
                Err(err) => {
                    self.release_units(reserved.iter().map(|u| u.id));
                    return Err(err);
                }
            }
        }
        Ok(Some(reserved))
    }

    /// Best-effort compensating release. Failures are logged, not raised:
    /// the caller is already unwinding and a unit we reserved moments ago
    /// has no legitimate other writer.
    fn release_units(&self, unit_ids: impl Iterator<Item = Uuid>) {
        for unit_id in unit_ids {
            if let Err(err) = self.store.units.mutate(unit_id, |u| u.release()) {
                tracing::error!(unit_id = %unit_id, %err, "failed to release reserved unit");
            }
        }
    }

    fn reserved_unit_ids(&self, request_id: Uuid) -> BankResult<Vec<Uuid>> {
        Ok(self
            .store
            .units
            .list()?
            .into_iter()
            .filter(|u| {
                u.status == UnitStatus::Reserved
                    && u.reservation.as_ref().is_some_and(|r| r.request_id == request_id)
            })
            .map(|u| u.id)
            .collect())
    }

    fn scheduled_transfusion_of(&self, request_id: Uuid) -> BankResult<Option<Transfusion>> {
        Ok(self
            .store
            .transfusions
            .list()?
            .into_iter()
            .find(|t| {
                t.request_id == request_id && t.status == TransfusionStatus::Scheduled
            }))
    }
}
