//! OpenSSH timespec parsing and validity windows.
//!
//! Timespecs are fixed-width digit runs with an optional trailing `Z`:
//! `YYYYMMDD[Z]`, `YYYYMMDDHHMM[Z]`, `YYYYMMDDHHMMSS[Z]`. The layout is
//! selected strictly by token length; without the `Z` suffix the token
//! is read in the local timezone, with it in UTC. No other separators
//! or formats are accepted.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parse an OpenSSH timestamp token into an absolute instant.
///
/// Local-zone layouts resolve through [`chrono::Local`]. A wall-clock
/// time that does not exist locally (DST gap) is rejected as
/// [`Error::InvalidTimespec`]; an ambiguous one (DST fold) resolves to
/// the earlier instant.
pub fn parse_timespec(token: &str) -> Result<DateTime<Utc>> {
    let (digits, utc) = match token.strip_suffix('Z') {
        Some(digits) => (digits, true),
        None => (token, false),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidTimespec(token.to_string()));
    }
    let naive = match digits.len() {
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d")
            .map(|d| d.and_time(NaiveTime::MIN)),
        12 => NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M"),
        14 => NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S"),
        _ => return Err(Error::InvalidTimespec(token.to_string())),
    }
    .map_err(|_| Error::InvalidTimespec(token.to_string()))?;

    if utc {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(Error::InvalidTimespec(token.to_string())),
    }
}

/// An optional validity window. An absent bound is unbounded in that
/// direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub valid_after: Option<DateTime<Utc>>,
    pub valid_before: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// True iff `now` falls inside the window: `valid_after` is an
    /// inclusive lower bound, `valid_before` an exclusive upper bound.
    ///
    /// An inverted window (after past before) never contains anything.
    /// It is not rejected at construction: a dead entry in a credential
    /// file denies, which is the safe direction.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if let Some(after) = self.valid_after {
            if now < after {
                return false;
            }
        }
        if let Some(before) = self.valid_before {
            if now >= before {
                return false;
            }
        }
        true
    }
}
