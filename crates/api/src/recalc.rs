// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background recalculation of daily records.
//!
//! A job covers every (employee, work date) cell of a range. Cells run on a
//! bounded worker pool and each one is recomputed from scratch, so running a
//! job twice leaves the stored records unchanged. Cancelling a job stops new
//! cells from starting; cells already running finish and keep their results.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clockwork_domain::{AttendanceSettings, DateRange, DomainError, format_date};
use time::Date;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    CellFailure, JobState, RecalcJobInfo, RecalculateAccepted, RecalculateRequest,
};
use crate::schedule::parse_range;

/// Longest range one recalculation may cover.
pub const MAX_RECALC_DAYS: i64 = 366;

/// Finished jobs kept for status queries.
const RETAINED_FINISHED_JOBS: usize = 256;

#[derive(Debug)]
struct JobEntry {
    info: RecalcJobInfo,
    token: CancellationToken,
}

/// Registry of recalculation jobs, shared by every engine clone.
#[derive(Debug, Clone, Default)]
pub struct RecalcJobs {
    next_id: Arc<AtomicU64>,
    entries: Arc<Mutex<HashMap<u64, JobEntry>>>,
}

impl RecalcJobs {
    async fn register(
        &self,
        range: DateRange,
        settings_version: i64,
        total_cells: usize,
    ) -> (u64, CancellationToken) {
        let job_id: u64 = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token: CancellationToken = CancellationToken::new();

        let mut entries = self.entries.lock().await;
        let mut finished: Vec<u64> = entries
            .iter()
            .filter(|(_, e)| e.info.state != JobState::Running)
            .map(|(id, _)| *id)
            .collect();
        if finished.len() >= RETAINED_FINISHED_JOBS {
            finished.sort_unstable();
            let excess: usize = finished.len() + 1 - RETAINED_FINISHED_JOBS;
            for id in finished.iter().take(excess) {
                entries.remove(id);
            }
        }

        entries.insert(
            job_id,
            JobEntry {
                info: RecalcJobInfo {
                    job_id,
                    state: JobState::Running,
                    start_date: format_date(range.start()),
                    end_date: format_date(range.end()),
                    settings_version,
                    total_cells,
                    completed_cells: 0,
                    skipped_cells: 0,
                    failures: Vec::new(),
                },
                token: token.clone(),
            },
        );
        (job_id, token)
    }

    async fn record_cell(
        &self,
        job_id: u64,
        employee_id: i64,
        work_date: Date,
        outcome: Result<(), String>,
    ) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&job_id) else {
            return;
        };
        match outcome {
            Ok(()) => entry.info.completed_cells += 1,
            Err(reason) => entry.info.failures.push(CellFailure {
                employee_id,
                work_date: format_date(work_date),
                reason,
            }),
        }
    }

    async fn finish(&self, job_id: u64, skipped_cells: usize) -> Option<RecalcJobInfo> {
        let mut entries = self.entries.lock().await;
        let entry: &mut JobEntry = entries.get_mut(&job_id)?;
        entry.info.skipped_cells = skipped_cells;
        entry.info.state = if skipped_cells > 0 {
            JobState::Cancelled
        } else {
            JobState::Completed
        };
        entry
            .info
            .failures
            .sort_by(|a, b| (&a.work_date, a.employee_id).cmp(&(&b.work_date, b.employee_id)));
        Some(entry.info.clone())
    }

    async fn status(&self, job_id: u64) -> Option<RecalcJobInfo> {
        self.entries.lock().await.get(&job_id).map(|e| e.info.clone())
    }

    async fn cancel(&self, job_id: u64) -> Option<RecalcJobInfo> {
        let entries = self.entries.lock().await;
        let entry: &JobEntry = entries.get(&job_id)?;
        entry.token.cancel();
        Some(entry.info.clone())
    }
}

/// A validated job ready to run.
struct PreparedJob {
    range: DateRange,
    settings: AttendanceSettings,
    employee_ids: Vec<i64>,
}

impl PreparedJob {
    fn total_cells(&self) -> usize {
        usize::try_from(self.range.len_days())
            .unwrap_or(0)
            .saturating_mul(self.employee_ids.len())
    }
}

fn job_not_found(job_id: u64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Recalculation job"),
        message: format!("Recalculation job {job_id} not found"),
    }
}

impl Engine {
    /// Starts a background recalculation and returns immediately.
    ///
    /// The settings version is read once here and used for every cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is malformed or longer than
    /// [`MAX_RECALC_DAYS`], or an employee does not exist.
    pub async fn start_recalculation(
        &self,
        request: &RecalculateRequest,
    ) -> Result<RecalculateAccepted, ApiError> {
        let range: DateRange = parse_range(&request.start_date, &request.end_date)?;
        let prepared: PreparedJob = self
            .prepare_job(range, request.employee_ids.as_deref())
            .await?;
        let total_cells: usize = prepared.total_cells();
        let (job_id, token) = self
            .jobs
            .register(range, prepared.settings.version, total_cells)
            .await;

        info!(
            job_id,
            %range,
            employees = prepared.employee_ids.len(),
            total_cells,
            settings_version = prepared.settings.version,
            "Recalculation accepted"
        );

        let engine: Self = self.clone();
        tokio::spawn(async move {
            engine.run_job(job_id, prepared, token).await;
        });

        Ok(RecalculateAccepted {
            job_id,
            total_cells,
        })
    }

    /// Runs a recalculation to completion before returning.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Engine::start_recalculation`].
    pub async fn recalculate_now(
        &self,
        range: DateRange,
        employee_ids: Option<&[i64]>,
    ) -> Result<RecalcJobInfo, ApiError> {
        let prepared: PreparedJob = self.prepare_job(range, employee_ids).await?;
        let (job_id, token) = self
            .jobs
            .register(range, prepared.settings.version, prepared.total_cells())
            .await;
        self.run_job(job_id, prepared, token).await;
        self.jobs.status(job_id).await.ok_or_else(|| job_not_found(job_id))
    }

    /// Reports the progress of a job.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` for an unknown job.
    pub async fn recalculation_status(&self, job_id: u64) -> Result<RecalcJobInfo, ApiError> {
        self.jobs.status(job_id).await.ok_or_else(|| job_not_found(job_id))
    }

    /// Requests cancellation of a job. Cancelling a finished job has no effect.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` for an unknown job.
    pub async fn cancel_recalculation(&self, job_id: u64) -> Result<RecalcJobInfo, ApiError> {
        let info: RecalcJobInfo = self
            .jobs
            .cancel(job_id)
            .await
            .ok_or_else(|| job_not_found(job_id))?;
        info!(job_id, "Recalculation cancellation requested");
        Ok(info)
    }

    async fn prepare_job(
        &self,
        range: DateRange,
        employee_ids: Option<&[i64]>,
    ) -> Result<PreparedJob, ApiError> {
        if range.len_days() > MAX_RECALC_DAYS {
            return Err(range_too_long());
        }

        self.with_persistence("prepare_recalculation", |p| {
            let settings: AttendanceSettings = p
                .get_current_settings()
                .map_err(translate_persistence_error)?;
            let employee_ids: Vec<i64> = match employee_ids {
                Some(ids) => {
                    let unique: BTreeSet<i64> = ids.iter().copied().collect();
                    for employee_id in &unique {
                        if p.get_employee(*employee_id)
                            .map_err(translate_persistence_error)?
                            .is_none()
                        {
                            return Err(translate_domain_error(DomainError::EmployeeNotFound(
                                *employee_id,
                            )));
                        }
                    }
                    unique.into_iter().collect()
                }
                None => p
                    .list_active_employee_ids()
                    .map_err(translate_persistence_error)?,
            };
            Ok(PreparedJob {
                range,
                settings,
                employee_ids,
            })
        })
        .await
    }

    async fn run_job(&self, job_id: u64, job: PreparedJob, token: CancellationToken) {
        let total_cells: usize = job.total_cells();
        let settings: Arc<AttendanceSettings> = Arc::new(job.settings);
        let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(self.config.recalc_concurrency));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut started: usize = 0;

        'cells: for work_date in job.range.days() {
            for employee_id in job.employee_ids.iter().copied() {
                let permit = tokio::select! {
                    biased;
                    () = token.cancelled() => break 'cells,
                    permit = Arc::clone(&semaphore).acquire_owned() => permit,
                };
                let Ok(permit) = permit else {
                    error!(job_id, "Recalculation worker pool closed");
                    break 'cells;
                };

                started += 1;
                let engine: Self = self.clone();
                let settings: Arc<AttendanceSettings> = Arc::clone(&settings);
                tasks.spawn(async move {
                    let _permit = permit;
                    let outcome: Result<(), String> = engine
                        .recalculate_cell(employee_id, work_date, &settings)
                        .await
                        .map(|_| ())
                        .map_err(|e| {
                            warn!(job_id, employee_id, %work_date, error = %e, "Cell recalculation failed");
                            e.to_string()
                        });
                    engine
                        .jobs
                        .record_cell(job_id, employee_id, work_date, outcome)
                        .await;
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(job_id, error = %err, "Recalculation task failed");
            }
        }

        let skipped: usize = total_cells.saturating_sub(started);
        if let Some(info) = self.jobs.finish(job_id, skipped).await {
            info!(
                job_id,
                state = ?info.state,
                completed = info.completed_cells,
                failed = info.failures.len(),
                skipped = info.skipped_cells,
                "Recalculation finished"
            );
        }
    }
}

fn range_too_long() -> ApiError {
    ApiError::InvalidInput {
        field: String::from("end_date"),
        message: format!("A recalculation spans at most {MAX_RECALC_DAYS} days"),
    }
}
