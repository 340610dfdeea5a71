// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The shared engine handle used by every service.

use std::sync::Arc;

use clockwork_persistence::Persistence;
use time::Date;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::keyed_lock::KeyedLocks;
use crate::recalc::RecalcJobs;
use crate::retry::RetryPolicy;

/// Tunables for the engine services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Employees scheduled at once by a batch.
    pub batch_concurrency: usize,
    /// Daily record cells computed at once by a recalculation.
    pub recalc_concurrency: usize,
    /// Retry policy for transient storage failures.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 8,
            recalc_concurrency: 8,
            retry: RetryPolicy::default(),
        }
    }
}

/// Cheap-to-clone handle over storage, locks and running jobs.
#[derive(Clone)]
pub struct Engine {
    persistence: Arc<Mutex<Persistence>>,
    /// Serializes assignment mutations per employee.
    pub(crate) employee_locks: KeyedLocks<i64>,
    /// Serializes daily record computation per (employee, work date).
    pub(crate) cell_locks: KeyedLocks<(i64, Date)>,
    pub(crate) jobs: RecalcJobs,
    pub(crate) config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(persistence: Persistence, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(Mutex::new(persistence)), config)
    }

    /// Builds an engine over an already shared persistence handle.
    #[must_use]
    pub fn from_shared(persistence: Arc<Mutex<Persistence>>, config: EngineConfig) -> Self {
        Self {
            persistence,
            employee_locks: KeyedLocks::new(),
            cell_locks: KeyedLocks::new(),
            jobs: RecalcJobs::default(),
            config: EngineConfig {
                batch_concurrency: config.batch_concurrency.max(1),
                recalc_concurrency: config.recalc_concurrency.max(1),
                retry: config.retry,
            },
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared persistence handle.
    #[must_use]
    pub fn persistence(&self) -> Arc<Mutex<Persistence>> {
        Arc::clone(&self.persistence)
    }

    /// Runs `f` against storage, retrying transient failures with backoff.
    ///
    /// The storage lock is released between attempts. Exhausted retries
    /// surface as `ApiError::Internal`.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error of `f`, or `ApiError::Internal`
    /// once the retry budget is spent.
    pub(crate) async fn with_persistence<T, F>(
        &self,
        operation: &'static str,
        mut f: F,
    ) -> Result<T, ApiError>
    where
        T: Send,
        F: FnMut(&mut Persistence) -> Result<T, ApiError> + Send,
    {
        let mut failed_attempts: u32 = 0;
        loop {
            let outcome: Result<T, ApiError> = {
                let mut persistence = self.persistence.lock().await;
                f(&mut persistence)
            };

            match outcome {
                Err(err) if err.is_transient() => {
                    failed_attempts += 1;
                    if !self.config.retry.allows_retry(failed_attempts) {
                        error!(operation, attempts = failed_attempts, error = %err, "Retries exhausted");
                        return Err(ApiError::Internal {
                            message: format!(
                                "{operation} failed after {failed_attempts} attempts: {err}"
                            ),
                        });
                    }
                    let delay = self.config.retry.delay_for(failed_attempts);
                    warn!(
                        operation,
                        attempt = failed_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Transient storage failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
