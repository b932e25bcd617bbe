//! In-memory JobLockRepository implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::repository::{JobLease, JobLockRepository, RepositoryError, Result};

/// Last-run timestamps per job name.
///
/// The whole compare-and-set happens under one mutex, so two callers racing
/// for the same interval cannot both win.
#[derive(Debug, Default)]
pub struct InMemoryJobLock {
    runs: Mutex<HashMap<String, i64>>,
}

impl InMemoryJobLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobLockRepository for InMemoryJobLock {
    fn try_acquire(&self, job: &str, now: i64, interval: i64) -> Result<Option<JobLease>> {
        let mut runs = self.runs.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        let previous = runs.get(job).copied();
        if previous.is_some_and(|last| now - last < interval) {
            debug!(job, ?previous, now, "job lock not due");
            return Ok(None);
        }
        runs.insert(job.to_owned(), now);
        debug!(job, now, "job lock acquired");
        Ok(Some(JobLease {
            job: job.to_owned(),
            acquired_at: now,
            previous,
        }))
    }

    fn rollback(&self, lease: &JobLease) -> Result<()> {
        let mut runs = self.runs.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        if runs.get(&lease.job) != Some(&lease.acquired_at) {
            return Ok(());
        }
        match lease.previous {
            Some(previous) => runs.insert(lease.job.clone(), previous),
            None => runs.remove(&lease.job),
        };
        debug!(job = %lease.job, previous = ?lease.previous, "job lock rolled back");
        Ok(())
    }

    fn last_run(&self, job: &str) -> Result<Option<i64>> {
        let runs = self.runs.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(runs.get(job).copied())
    }
}
