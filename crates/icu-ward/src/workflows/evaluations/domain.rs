use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::patients::Rut;
use crate::workflows::scoring::complexity::KINESIOLOGY;
use crate::workflows::scoring::severity::APACHE_II;
use crate::workflows::scoring::{ComponentScore, ComponentSelection, Scale, Tier};

/// Identifier wrapper for stored evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// The two clinical evaluations the ward records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// APACHE II, recorded once per patient stay.
    Severity,
    /// Kinesiology categorization, recorded once per patient per day.
    Complexity,
}

impl EvaluationKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Severity, Self::Complexity]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Severity => "severity",
            Self::Complexity => "complexity",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
    }

    pub const fn scale(self) -> &'static Scale {
        match self {
            Self::Severity => &APACHE_II,
            Self::Complexity => &KINESIOLOGY,
        }
    }

    /// Severity is unique per patient; complexity per patient and calendar date.
    pub fn key(self, patient_rut: &Rut, evaluation_date: NaiveDate) -> EvaluationKey {
        EvaluationKey {
            kind: self,
            patient_rut: patient_rut.clone(),
            date: match self {
                Self::Severity => None,
                Self::Complexity => Some(evaluation_date),
            },
        }
    }
}

/// Uniqueness key enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvaluationKey {
    pub kind: EvaluationKind,
    pub patient_rut: Rut,
    pub date: Option<NaiveDate>,
}

/// Form payload as submitted by a clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub patient_rut: Rut,
    pub evaluation_date: NaiveDate,
    #[serde(default)]
    pub selections: BTreeMap<String, ComponentSelection>,
}

/// Stored clinical evaluation. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub kind: EvaluationKind,
    pub patient_rut: Rut,
    pub evaluation_date: NaiveDate,
    pub author_id: String,
    pub component_scores: BTreeMap<String, ComponentScore>,
    pub total_score: u32,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn key(&self) -> EvaluationKey {
        self.kind.key(&self.patient_rut, self.evaluation_date)
    }

    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            id: self.id.clone(),
            kind: self.kind,
            patient_rut: self.patient_rut.clone(),
            evaluation_date: self.evaluation_date,
            total_score: self.total_score,
            tier: self.tier.label.clone(),
            author_id: self.author_id.clone(),
        }
    }
}

/// What the UI shows when a second evaluation is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub id: EvaluationId,
    pub kind: EvaluationKind,
    pub patient_rut: Rut,
    pub evaluation_date: NaiveDate,
    pub total_score: u32,
    pub tier: String,
    pub author_id: String,
}
