//! Versioned in-memory storage with optimistic concurrency.
//!
//! Each entity kind lives in its own [`Table`]: a `RwLock`ed map of id to
//! [`Versioned`] record. Readers clone snapshots out; writers commit with
//! compare-and-set against the version they read, so a record that moved
//! underneath an operation fails with `ConcurrentModification` instead of
//! silently overwriting. Multi-record operations build their atomicity on
//! top of this, one CAS per record (see the allocation saga in the requests
//! service).

use crate::donation::Donation;
use crate::donor::Donor;
use crate::error::{BankError, BankResult};
use crate::request::BloodRequest;
use crate::transfusion::Transfusion;
use crate::unit::BloodUnit;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// A stored record plus the version its next write must name.
#[derive(Clone, Debug)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

/// One entity kind's rows.
pub struct Table<T> {
    entity: &'static str,
    rows: RwLock<HashMap<Uuid, Versioned<T>>>,
}

impl<T: Clone> Table<T> {
    fn new(entity: &'static str) -> Self {
        Table {
            entity,
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn not_found(&self, id: Uuid) -> BankError {
        BankError::NotFound {
            entity: self.entity,
            id,
        }
    }

    /// Insert a fresh record at version 1. Ids come from `Uuid::new_v4`, so
    /// an occupied slot is not checked for.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` only.
    pub fn insert(&self, id: Uuid, record: T) -> BankResult<()> {
        let mut rows = self.rows.write().map_err(|_| BankError::LockPoisoned)?;
        rows.insert(id, Versioned { record, version: 1 });
        Ok(())
    }

    /// Snapshot one row.
    ///
    /// # Errors
    ///
    /// `NotFound` or `LockPoisoned`.
    pub fn get(&self, id: Uuid) -> BankResult<Versioned<T>> {
        let rows = self.rows.read().map_err(|_| BankError::LockPoisoned)?;
        rows.get(&id).cloned().ok_or_else(|| self.not_found(id))
    }

    /// Snapshot every record, in no particular order.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` only.
    pub fn list(&self) -> BankResult<Vec<T>> {
        let rows = self.rows.read().map_err(|_| BankError::LockPoisoned)?;
        Ok(rows.values().map(|row| row.record.clone()).collect())
    }

    /// Compare-and-set: replace the record only if its version is still the
    /// one the caller read. Returns the new version.
    ///
    /// # Errors
    ///
    /// `ConcurrentModification` on a version mismatch, `NotFound`,
    /// `LockPoisoned`.
    pub fn commit(&self, id: Uuid, expected_version: u64, record: T) -> BankResult<u64> {
        let mut rows = self.rows.write().map_err(|_| BankError::LockPoisoned)?;
        let row = rows.get_mut(&id).ok_or_else(|| self.not_found(id))?;
        if row.version != expected_version {
            return Err(BankError::ConcurrentModification);
        }
        row.version += 1;
        row.record = record;
        Ok(row.version)
    }

    /// Apply a closure to one row under the write lock. Linearizable by
    /// construction; use it for single-record bookkeeping that must not
    /// race, never for logic that reads other tables.
    ///
    /// # Errors
    ///
    /// `NotFound`, `LockPoisoned`, or whatever the closure returns. A
    /// closure error leaves the record and version untouched.
    pub fn mutate<R>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut T) -> BankResult<R>,
    ) -> BankResult<R> {
        let mut rows = self.rows.write().map_err(|_| BankError::LockPoisoned)?;
        let row = rows.get_mut(&id).ok_or_else(|| self.not_found(id))?;
        let mut candidate = row.record.clone();
        let out = apply(&mut candidate)?;
        row.record = candidate;
        row.version += 1;
        Ok(out)
    }
}

/// The whole bank: one table per entity kind. Cheap to share behind an
/// `Arc`; all interior mutability is per-table.
pub struct BankStore {
    pub donors: Table<Donor>,
    pub donations: Table<Donation>,
    pub units: Table<BloodUnit>,
    pub requests: Table<BloodRequest>,
    pub transfusions: Table<Transfusion>,
}

impl BankStore {
    pub fn new() -> Self {
        BankStore {
            donors: Table::new("donor"),
            donations: Table::new("donation"),
            units: Table::new("unit"),
            requests: Table::new("request"),
            transfusions: Table::new("transfusion"),
        }
    }
}

impl Default for BankStore {
    fn default() -> Self {
        Self::new()
    }
}
