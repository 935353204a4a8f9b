use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{ActionKind, TargetKey};

/// Allows at most one outstanding request per `(target, action)` pair.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    pending: Mutex<HashSet<(TargetKey, ActionKind)>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, HashSet<(TargetKey, ActionKind)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the pair as pending. Returns `false` if it already was.
    pub fn begin(&self, key: &TargetKey, action: ActionKind) -> bool {
        self.pending().insert((key.clone(), action))
    }

    /// Clears the pending record, whatever the request's outcome.
    pub fn end(&self, key: &TargetKey, action: ActionKind) {
        self.pending().remove(&(key.clone(), action));
    }

    pub fn is_pending(&self, key: &TargetKey, action: ActionKind) -> bool {
        self.pending().contains(&(key.clone(), action))
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like `begin`, but the record is cleared when the returned ticket drops.
    pub fn ticket(&self, key: &TargetKey, action: ActionKind) -> Option<InFlightTicket<'_>> {
        self.begin(key, action).then(|| InFlightTicket {
            guard: self,
            key: key.clone(),
            action,
        })
    }
}

#[derive(Debug)]
pub struct InFlightTicket<'g> {
    guard: &'g InFlightGuard,
    key: TargetKey,
    action: ActionKind,
}

impl InFlightTicket<'_> {
    pub fn key(&self) -> &TargetKey {
        &self.key
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.guard.end(&self.key, self.action);
    }
}
