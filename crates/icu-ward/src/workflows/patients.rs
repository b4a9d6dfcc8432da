//! Read-only views of the patient and identity collaborators.
//!
//! Patient records are owned by the admissions subsystem; the ward engine only reads the
//! admission window and birth date it needs to validate and score evaluations.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Chilean national identifier, stored normalized as `<digits>-<check digit>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rut(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RutError {
    #[error("rut is empty")]
    Empty,
    #[error("rut '{0}' must be digits followed by a check digit")]
    Malformed(String),
    #[error("rut '{0}' has an invalid check digit")]
    CheckDigit(String),
}

impl Rut {
    /// Accepts `12.345.678-5`, `12345678-5` or `123456785`; `k` is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, RutError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.is_empty() {
            return Err(RutError::Empty);
        }
        if cleaned.len() < 2 {
            return Err(RutError::Malformed(raw.to_string()));
        }

        let (body, check) = cleaned.split_at(cleaned.len() - 1);
        if !body.chars().all(|c| c.is_ascii_digit()) {
            return Err(RutError::Malformed(raw.to_string()));
        }
        let check = check.chars().next().ok_or(RutError::Empty)?;
        if !(check.is_ascii_digit() || check == 'K') {
            return Err(RutError::Malformed(raw.to_string()));
        }

        let body = body.trim_start_matches('0');
        if body.is_empty() {
            return Err(RutError::Malformed(raw.to_string()));
        }
        if check_digit(body) != check {
            return Err(RutError::CheckDigit(raw.to_string()));
        }

        Ok(Self(format!("{body}-{check}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Modulo 11 with the repeating 2..=7 weight series, applied right to left.
fn check_digit(body: &str) -> char {
    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip([2u32, 3, 4, 5, 6, 7].into_iter().cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        value => char::from_digit(value, 10).unwrap_or('0'),
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rut::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Admission data the engine needs from the patient collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub rut: Rut,
    pub bed_number: Option<u8>,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub birth_date: NaiveDate,
}

impl PatientSnapshot {
    /// Whole years completed on `on`.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        let mut years = on.year() - self.birth_date.year();
        if (on.month(), on.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn is_hospitalized(&self) -> bool {
        self.discharge_date.is_none()
    }
}

/// Lookup seam for the admissions subsystem.
pub trait PatientDirectory: Send + Sync {
    fn patient(&self, rut: &Rut) -> Result<Option<PatientSnapshot>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("patient directory unavailable: {0}")]
    Unavailable(String),
}

/// Elevated roles may edit or delete records they did not author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Clinician,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Clinician => "clinician",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Some(Self::Administrator),
            "clinician" => Some(Self::Clinician),
            _ => None,
        }
    }
}

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn is_elevated(&self) -> bool {
        self.role == Role::Administrator
    }

    /// Authors and administrators may change or delete a record.
    pub fn may_modify(&self, author_id: &str) -> bool {
        self.is_elevated() || self.id == author_id
    }
}
