//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default cap on a dictation session (5 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;

/// Default pause between interim transcriptions (3 seconds)
pub const DEFAULT_INTERIM_INTERVAL_SECS: u64 = 3;

/// Default length after which a dictation segment is finalized (15 seconds)
pub const DEFAULT_SEGMENT_LENGTH_SECS: u64 = 15;

const MS_PER_SEC: u64 = 1000;
const MS_PER_MIN: u64 = 60 * MS_PER_SEC;
const MS_PER_HOUR: u64 = 60 * MS_PER_MIN;

/// Positive span of time written as `1m30s`, `45s` or `1500ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self::from_millis(secs * MS_PER_SEC)
    }

    /// Default cap on a dictation session
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    /// Default pause between interim transcriptions
    pub const fn default_interim_interval() -> Self {
        Self::from_secs(DEFAULT_INTERIM_INTERVAL_SECS)
    }

    /// Default dictation segment length
    pub const fn default_segment_length() -> Self {
        Self::from_secs(DEFAULT_SEGMENT_LENGTH_SECS)
    }

    /// Whole seconds, rounded down
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / MS_PER_SEC
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// A sequence of `<number><unit>` terms, units `h`, `m`, `s` or `ms`,
    /// each used at most once and largest first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();
        let mut rest = input.as_str();
        let mut total: u64 = 0;
        let mut last_scale = u64::MAX;

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(err)?;
            if digits == 0 {
                return Err(err());
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| err())?;
            rest = &rest[digits..];

            let (scale, unit_len) = if rest.starts_with("ms") {
                (1, 2)
            } else if rest.starts_with('h') {
                (MS_PER_HOUR, 1)
            } else if rest.starts_with('m') {
                (MS_PER_MIN, 1)
            } else if rest.starts_with('s') {
                (MS_PER_SEC, 1)
            } else {
                return Err(err());
            };
            if scale >= last_scale {
                return Err(err());
            }
            last_scale = scale;
            rest = &rest[unit_len..];

            total = amount
                .checked_mul(scale)
                .and_then(|ms| total.checked_add(ms))
                .ok_or_else(err)?;
        }

        if total == 0 {
            return Err(err());
        }
        Ok(Self::from_millis(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.milliseconds;
        if rest == 0 {
            return write!(f, "0s");
        }

        for (scale, unit) in [
            (MS_PER_HOUR, "h"),
            (MS_PER_MIN, "m"),
            (MS_PER_SEC, "s"),
            (1, "ms"),
        ] {
            if rest >= scale {
                write!(f, "{}{}", rest / scale, unit)?;
                rest %= scale;
            }
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_duration()
    }
}
