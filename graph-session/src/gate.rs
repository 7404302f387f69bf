use crate::error::{Result, SessionError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// At most one server-mutating request (merge, reset, push, pull) in flight
/// per repository. Clones share the same set of busy repositories.
#[derive(Debug, Clone, Default)]
pub struct MutationGate {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn busy(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `repository`; the claim lasts as long as the returned permit
    pub fn try_acquire(&self, repository: &str) -> Result<MutationPermit> {
        if !self.busy().insert(repository.to_string()) {
            return Err(SessionError::MutationInFlight(repository.to_string()));
        }
        debug!(%repository, "mutation started");
        Ok(MutationPermit {
            gate: self.clone(),
            repository: repository.to_string(),
        })
    }

    pub fn is_busy(&self, repository: &str) -> bool {
        self.busy().contains(repository)
    }
}

#[derive(Debug)]
pub struct MutationPermit {
    gate: MutationGate,
    repository: String,
}

impl MutationPermit {
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl Drop for MutationPermit {
    fn drop(&mut self) {
        self.gate.busy().remove(&self.repository);
        debug!(repository = %self.repository, "mutation finished");
    }
}
