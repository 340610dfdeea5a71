// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned attendance settings and auto-calculation scheduling.
//!
//! Settings are never edited in place. Each change produces a new version and
//! every daily record remembers the version it was computed with.

use crate::clock::work_date_of;
use crate::error::DomainError;
use chrono::{
    DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::macros::time;
use time::{Date, Month, PrimitiveDateTime, Time};

/// One version of the attendance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSettings {
    /// Monotonic version, `0` for the built-in defaults.
    pub version: i64,
    /// Clock-of-day at which one work date ends and the next begins.
    pub day_switch_time: Time,
    /// Clock-of-day at which the prior work date is recalculated.
    pub auto_calc_time: Time,
    /// IANA timezone name the wall-clock values are expressed in.
    pub timezone: String,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            version: 0,
            day_switch_time: time!(00:00),
            auto_calc_time: time!(01:00),
            timezone: String::from("UTC"),
        }
    }
}

impl AttendanceSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` when the timezone is unknown.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.tz().map(|_| ())
    }

    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` when the timezone is unknown.
    pub fn tz(&self) -> Result<Tz, DomainError> {
        self.timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(self.timezone.clone()))
    }

    /// Computes the next auto-calculation firing strictly after `now`.
    ///
    /// Returns the UTC instant to fire at and the work date to recalculate:
    /// the last work date already closed at the nominal firing time under the
    /// day switch. A firing time that falls into a DST gap moves forward by
    /// one hour.
    ///
    /// With the day switch at midnight this is the calendar day before the
    /// firing day. When the firing time is earlier than the day switch, the
    /// firing instant still belongs to the previous work date, so the one
    /// before that is recalculated.
    ///
    /// # Errors
    ///
    /// Returns an error when the timezone is unknown or a date cannot be represented.
    pub fn next_auto_calc(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, Date), DomainError> {
        let tz: Tz = self.tz()?;
        let fire_time: NaiveTime = to_naive_time(self.auto_calc_time)?;
        let local_today: NaiveDate = now.with_timezone(&tz).date_naive();

        let mut day: NaiveDate = local_today;
        for _ in 0..3 {
            let fire_at: DateTime<Utc> = resolve_local(&tz, day.and_time(fire_time))?;
            if fire_at > now {
                let fire_local: PrimitiveDateTime =
                    PrimitiveDateTime::new(from_naive_date(day)?, self.auto_calc_time);
                let open: Date = work_date_of(fire_local, self.day_switch_time);
                let closed: Date = open.previous_day().ok_or_else(|| {
                    DomainError::DateArithmeticOverflow {
                        operation: format!("computing the work date before {open}"),
                    }
                })?;
                return Ok((fire_at, closed));
            }
            day = day
                .succ_opt()
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("computing the day after {day}"),
                })?;
        }

        Err(DomainError::InvalidSettings {
            reason: format!("could not schedule auto calculation after {now}"),
        })
    }
}

fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>, DomainError> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Ok(dt.with_timezone(&Utc));
    }
    let shifted: NaiveDateTime = naive
        .checked_add_signed(ChronoDuration::hours(1))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("skipping the DST gap at {naive}"),
        })?;
    tz.from_local_datetime(&shifted)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::InvalidSettings {
            reason: format!("local time {naive} does not exist in the configured timezone"),
        })
}

fn to_naive_time(t: Time) -> Result<NaiveTime, DomainError> {
    NaiveTime::from_hms_opt(
        u32::from(t.hour()),
        u32::from(t.minute()),
        u32::from(t.second()),
    )
    .ok_or_else(|| DomainError::InvalidSettings {
        reason: format!("invalid auto calculation time {t}"),
    })
}

fn from_naive_date(d: NaiveDate) -> Result<Date, DomainError> {
    use chrono::Datelike;

    let month: Month = u8::try_from(d.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("converting {d}"),
        })?;
    let day: u8 = u8::try_from(d.day()).map_err(|_| DomainError::DateArithmeticOverflow {
        operation: format!("converting {d}"),
    })?;
    Date::from_calendar_date(d.year(), month, day).map_err(|e| DomainError::DateParseError {
        date_string: d.to_string(),
        error: e.to_string(),
    })
}
