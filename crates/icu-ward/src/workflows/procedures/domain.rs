use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::duration::ProcedureDuration;
use crate::workflows::patients::Rut;

/// Sequential identifier assigned by the store; ordering follows insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcedureId(pub u64);

impl fmt::Display for ProcedureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Nursing,
    Kinesiology,
    Medicine,
}

impl Discipline {
    pub const fn ordered() -> [Self; 3] {
        [Self::Nursing, Self::Kinesiology, Self::Medicine]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nursing => "nursing",
            Self::Kinesiology => "kinesiology",
            Self::Medicine => "medicine",
        }
    }

    /// Shifts a record of this discipline may carry. Empty means shifts are not tracked.
    pub const fn shifts(self) -> &'static [Shift] {
        match self {
            Self::Nursing => &[Shift::Day, Shift::Night],
            Self::Kinesiology => &[Shift::Morning, Shift::Afternoon, Shift::Night],
            Self::Medicine => &[],
        }
    }

    pub fn tracks_shifts(self) -> bool {
        !self.shifts().is_empty()
    }

    pub fn vocabulary(self) -> &'static [ProcedureDefinition] {
        match self {
            Self::Nursing => NURSING_PROCEDURES,
            Self::Kinesiology => KINESIOLOGY_PROCEDURES,
            Self::Medicine => MEDICINE_PROCEDURES,
        }
    }

    pub fn definition(self, key: &str) -> Option<&'static ProcedureDefinition> {
        self.vocabulary()
            .iter()
            .find(|definition| definition.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Day,
    Night,
    Morning,
    Afternoon,
}

impl Shift {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }
}

/// Entry of a discipline's controlled procedure vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcedureDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub patient_required: bool,
}

impl ProcedureDefinition {
    const fn patient(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            patient_required: true,
        }
    }

    const fn unit(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            patient_required: false,
        }
    }
}

const NURSING_PROCEDURES: &[ProcedureDefinition] = &[
    ProcedureDefinition::patient("central_line_care", "Central line care"),
    ProcedureDefinition::patient("wound_care", "Wound care"),
    ProcedureDefinition::patient("blood_sampling", "Blood sampling"),
    ProcedureDefinition::patient("urinary_catheter", "Urinary catheter insertion"),
    ProcedureDefinition::patient("nasogastric_tube", "Nasogastric tube insertion"),
    ProcedureDefinition::patient("patient_transfer", "Patient transfer"),
    ProcedureDefinition::unit("crash_cart_check", "Crash cart check"),
    ProcedureDefinition::unit("medication_inventory", "Medication inventory"),
    ProcedureDefinition::unit("shift_handover", "Shift handover"),
];

const KINESIOLOGY_PROCEDURES: &[ProcedureDefinition] = &[
    ProcedureDefinition::patient("respiratory_therapy", "Respiratory therapy"),
    ProcedureDefinition::patient("motor_therapy", "Motor therapy"),
    ProcedureDefinition::patient("airway_suctioning", "Airway suctioning"),
    ProcedureDefinition::patient("weaning_trial", "Ventilator weaning trial"),
    ProcedureDefinition::patient("early_mobilization", "Early mobilization"),
    ProcedureDefinition::unit("ventilator_setup", "Ventilator setup and testing"),
    ProcedureDefinition::unit("equipment_disinfection", "Equipment disinfection"),
];

const MEDICINE_PROCEDURES: &[ProcedureDefinition] = &[
    ProcedureDefinition::patient("central_venous_catheter", "Central venous catheter insertion"),
    ProcedureDefinition::patient("orotracheal_intubation", "Orotracheal intubation"),
    ProcedureDefinition::patient("arterial_line", "Arterial line insertion"),
    ProcedureDefinition::patient("family_meeting", "Family meeting"),
    ProcedureDefinition::unit("clinical_meeting", "Clinical meeting"),
    ProcedureDefinition::unit("teaching_round", "Teaching round"),
];

/// A single completed procedure as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub id: ProcedureId,
    pub discipline: Discipline,
    pub name: String,
    pub duration: ProcedureDuration,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub author_id: String,
    pub author_name: String,
    pub patient_rut: Option<Rut>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProcedureRecord {
    /// Key of the registro group this record belongs to when grouping per shift.
    pub fn registro_key(&self) -> RegistroKey {
        RegistroKey {
            date: self.date,
            shift: self.shift,
            author_id: self.author_id.clone(),
        }
    }

    pub fn view(&self) -> ProcedureView {
        let label = self
            .discipline
            .definition(&self.name)
            .map(|definition| definition.label)
            .unwrap_or("unlisted procedure");
        ProcedureView {
            id: self.id,
            discipline: self.discipline,
            name: self.name.clone(),
            label,
            date: self.date,
            shift: self.shift,
            duration: self.duration,
            duration_minutes: self.duration.minutes(),
            duration_label: self.duration.label(),
            author_id: self.author_id.clone(),
            author_name: self.author_name.clone(),
            patient_rut: self.patient_rut.clone(),
            observations: self.observations.clone(),
        }
    }
}

/// Record contents before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProcedure {
    pub discipline: Discipline,
    pub name: String,
    pub duration: ProcedureDuration,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub author_id: String,
    pub author_name: String,
    pub patient_rut: Option<Rut>,
    pub observations: Option<String>,
}

impl NewProcedure {
    pub fn into_record(self, id: ProcedureId, created_at: DateTime<Utc>) -> ProcedureRecord {
        ProcedureRecord {
            id,
            discipline: self.discipline,
            name: self.name,
            duration: self.duration,
            date: self.date,
            shift: self.shift,
            author_id: self.author_id,
            author_name: self.author_name,
            patient_rut: self.patient_rut,
            observations: self.observations,
            created_at,
        }
    }
}

/// Intake payload. The author comes from the request identity, never from the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDraft {
    pub discipline: Discipline,
    pub name: String,
    /// `HH:MM`; validated by the service so the error names the field.
    pub duration: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub shift: Option<Shift>,
    #[serde(default)]
    pub patient_rut: Option<Rut>,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Editable fields. Date, shift and author are fixed once a record exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedurePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Absent leaves the patient untouched; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub patient_rut: Option<Option<Rut>>,
    #[serde(default, deserialize_with = "present")]
    pub observations: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A patch after parsing, applied by the store to the row it currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureAmendment {
    pub name: Option<String>,
    pub duration: Option<ProcedureDuration>,
    pub patient_rut: Option<Option<Rut>>,
    pub observations: Option<Option<String>>,
}

impl ProcedureAmendment {
    /// Date, shift and author keep whatever value the row holds.
    pub fn apply_to(&self, record: &mut ProcedureRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(duration) = self.duration {
            record.duration = duration;
        }
        if let Some(patient_rut) = &self.patient_rut {
            record.patient_rut = patient_rut.clone();
        }
        if let Some(observations) = &self.observations {
            record.observations = observations.clone();
        }
    }
}

/// Identity of a registro group: what one person did on one shift of one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistroKey {
    pub date: NaiveDate,
    #[serde(default)]
    pub shift: Option<Shift>,
    pub author_id: String,
}

/// Query filter for listing records; every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub shift: Option<Shift>,
    pub author_id: Option<String>,
    pub patient_rut: Option<Rut>,
    pub discipline: Option<Discipline>,
}

impl ProcedureFilter {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &ProcedureRecord) -> bool {
        self.date_from.map_or(true, |from| record.date >= from)
            && self.date_to.map_or(true, |to| record.date <= to)
            && self.shift.map_or(true, |shift| record.shift == Some(shift))
            && self
                .author_id
                .as_deref()
                .map_or(true, |author| record.author_id == author)
            && self
                .patient_rut
                .as_ref()
                .map_or(true, |rut| record.patient_rut.as_ref() == Some(rut))
            && self
                .discipline
                .map_or(true, |discipline| record.discipline == discipline)
    }
}

/// Outward representation with the duration spelled out for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureView {
    pub id: ProcedureId,
    pub discipline: Discipline,
    pub name: String,
    pub label: &'static str,
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub duration: ProcedureDuration,
    pub duration_minutes: u32,
    pub duration_label: String,
    pub author_id: String,
    pub author_name: String,
    pub patient_rut: Option<Rut>,
    pub observations: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medicine_does_not_track_shifts() {
        assert!(Discipline::Nursing.tracks_shifts());
        assert!(Discipline::Kinesiology.shifts().contains(&Shift::Afternoon));
        assert!(!Discipline::Nursing.shifts().contains(&Shift::Morning));
        assert!(!Discipline::Medicine.tracks_shifts());
    }

    #[test]
    fn vocabulary_keys_are_unique_per_discipline() {
        for discipline in Discipline::ordered() {
            let vocabulary = discipline.vocabulary();
            for (index, definition) in vocabulary.iter().enumerate() {
                assert!(
                    vocabulary[index + 1..]
                        .iter()
                        .all(|other| other.key != definition.key),
                    "{} repeats {}",
                    discipline.label(),
                    definition.key
                );
            }
        }
    }

    #[test]
    fn unit_tasks_do_not_require_a_patient() {
        let check = Discipline::Nursing
            .definition("crash_cart_check")
            .expect("listed");
        assert!(!check.patient_required);
        let therapy = Discipline::Kinesiology
            .definition("respiratory_therapy")
            .expect("listed");
        assert!(therapy.patient_required);
        assert!(Discipline::Medicine.definition("respiratory_therapy").is_none());
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let untouched: ProcedurePatch =
            serde_json::from_str(r#"{"duration":"00:30"}"#).expect("patch");
        assert_eq!(untouched.patient_rut, None);

        let cleared: ProcedurePatch =
            serde_json::from_str(r#"{"patient_rut":null}"#).expect("patch");
        assert_eq!(cleared.patient_rut, Some(None));

        let replaced: ProcedurePatch =
            serde_json::from_str(r#"{"patient_rut":"12.345.678-5"}"#).expect("patch");
        assert_eq!(
            replaced.patient_rut,
            Some(Some(Rut::parse("12345678-5").expect("valid")))
        );
    }
}
