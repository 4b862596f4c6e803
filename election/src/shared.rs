//! Shared, write-serialized access to one election.
//!
//! Every command runs under a single mutex, so callers on different threads
//! observe commands one at a time, each fully applied or not at all.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ledger::ElectionLedger;

/// Clone-able handle to an [`ElectionLedger`] behind a mutex.
#[derive(Clone)]
pub struct SharedElection {
    inner: Arc<Mutex<ElectionLedger>>,
}

impl SharedElection {
    pub fn new(ledger: ElectionLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run a read-only closure against the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&ElectionLedger) -> R) -> R {
        f(&*self.lock())
    }

    /// Run a closure that may issue commands against the ledger.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ElectionLedger) -> R) -> R {
        f(&mut *self.lock())
    }

    // Commands never leave a partial mutation behind, so a poisoned
    // ledger is still consistent.
    fn lock(&self) -> MutexGuard<'_, ElectionLedger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
