// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Daily automatic recalculation of the previous work date.
//!
//! The loop sleeps in bounded naps so a settings change made while it waits
//! takes effect at the next wake-up.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clockwork_api::{ApiError, Engine, RecalcJobInfo};
use clockwork_domain::{AttendanceSettings, DateRange, DomainError};
use time::Date;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const MAX_NAP: Duration = Duration::from_secs(15 * 60);
const RETRY_AFTER_ERROR: Duration = Duration::from_secs(60);

/// The next firing of the auto-calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRun {
    pub fire_at: DateTime<Utc>,
    pub work_date: Date,
    pub wait: Duration,
}

/// Plans the next firing strictly after `now`.
///
/// # Errors
///
/// Returns an error when the settings cannot be scheduled.
pub fn plan_next_run(
    settings: &AttendanceSettings,
    now: DateTime<Utc>,
) -> Result<PlannedRun, DomainError> {
    let (fire_at, work_date) = settings.next_auto_calc(now)?;
    let wait: Duration = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
    Ok(PlannedRun {
        fire_at,
        work_date,
        wait,
    })
}

async fn recalculate_work_date(engine: &Engine, work_date: Date) -> Result<RecalcJobInfo, ApiError> {
    let range: DateRange = DateRange::new(work_date, work_date).map_err(|e| ApiError::Internal {
        message: e.to_string(),
    })?;
    engine.recalculate_now(range, None).await
}

/// Runs until `token` is cancelled.
pub async fn run(engine: Engine, token: CancellationToken) {
    info!("Auto calculation scheduler started");
    loop {
        let (nap, due): (Duration, Option<Date>) = match engine.current_settings().await {
            Ok(settings) => match plan_next_run(&settings, Utc::now()) {
                Ok(plan) => {
                    debug!(fire_at = %plan.fire_at, work_date = %plan.work_date, "Next auto calculation");
                    if plan.wait <= MAX_NAP {
                        (plan.wait, Some(plan.work_date))
                    } else {
                        (MAX_NAP, None)
                    }
                }
                Err(e) => {
                    error!(error = %e, timezone = %settings.timezone, "Cannot schedule auto calculation");
                    (RETRY_AFTER_ERROR, None)
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to load settings for auto calculation");
                (RETRY_AFTER_ERROR, None)
            }
        };

        tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = tokio::time::sleep(nap) => {}
        }

        let Some(work_date) = due else {
            continue;
        };

        info!(%work_date, actor = "system", "Starting auto calculation");
        match recalculate_work_date(&engine, work_date).await {
            Ok(job) => info!(
                %work_date,
                job_id = job.job_id,
                completed = job.completed_cells,
                failed = job.failures.len(),
                "Auto calculation finished"
            ),
            Err(e) => error!(%work_date, error = %e, "Auto calculation failed"),
        }
    }
    info!("Auto calculation scheduler stopped");
}
