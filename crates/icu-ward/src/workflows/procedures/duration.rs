use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Longest single procedure the intake form accepts: 23:59.
pub const MAX_PROCEDURE_MINUTES: u32 = 23 * 60 + 59;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("duration '{0}' must be written as HH:MM")]
    Malformed(String),
    #[error("duration '{0}' exceeds 23:59")]
    TooLong(String),
    #[error("a procedure cannot take zero minutes")]
    Zero,
}

/// Parses `HH:MM` (hours 0-23, minutes 0-59) into `60 * H + M` minutes.
pub fn parse_hhmm(raw: &str) -> Result<u32, DurationError> {
    let trimmed = raw.trim();
    let malformed = || DurationError::Malformed(raw.to_string());

    let (hours, minutes) = trimmed.split_once(':').ok_or_else(malformed)?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.chars().all(|c| c.is_ascii_digit())
        || !minutes.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }

    let hours: u32 = hours.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
    if minutes > 59 {
        return Err(malformed());
    }
    if hours > 23 {
        return Err(DurationError::TooLong(raw.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// `45m`, `2h` or `1h 5m`. Aggregated totals beyond a day keep counting hours.
pub fn format_minutes(total: u32) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    match (hours, minutes) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}

/// Duration of a single procedure; always between one minute and 23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcedureDuration(u32);

impl ProcedureDuration {
    pub fn parse(raw: &str) -> Result<Self, DurationError> {
        Self::from_minutes(parse_hhmm(raw)?)
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, DurationError> {
        match minutes {
            0 => Err(DurationError::Zero),
            m if m > MAX_PROCEDURE_MINUTES => Err(DurationError::TooLong(format!(
                "{:02}:{:02}",
                m / 60,
                m % 60
            ))),
            m => Ok(Self(m)),
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn label(self) -> String {
        format_minutes(self.0)
    }
}

impl fmt::Display for ProcedureDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ProcedureDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProcedureDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ProcedureDuration::parse(&raw).map_err(serde::de::Error::custom)
    }
}
