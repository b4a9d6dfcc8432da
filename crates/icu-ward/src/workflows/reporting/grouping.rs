use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::procedures::{
    format_minutes, Discipline, ProcedureId, ProcedureRecord, RegistroKey, Shift,
};

/// Procedures one author performed on one shift (or one day) seen as a single unit.
///
/// Derived on every read from the current records; nothing here is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistroGroup {
    pub date: NaiveDate,
    pub shift: Option<Shift>,
    pub discipline: Discipline,
    pub author_id: String,
    pub author_name: String,
    pub count: usize,
    pub total_duration_minutes: u32,
    pub total_duration_label: String,
    pub patient_count: usize,
    pub record_ids: Vec<ProcedureId>,
}

impl RegistroGroup {
    fn open(key: &RegistroKey, first: &ProcedureRecord) -> Self {
        Self {
            date: key.date,
            shift: key.shift,
            discipline: first.discipline,
            author_id: key.author_id.clone(),
            author_name: first.author_name.clone(),
            count: 0,
            total_duration_minutes: 0,
            total_duration_label: String::new(),
            patient_count: 0,
            record_ids: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &ProcedureRecord) {
        self.count += 1;
        self.total_duration_minutes += record.duration.minutes();
        if record.patient_rut.is_some() {
            self.patient_count += 1;
        }
        self.record_ids.push(record.id);
    }

    pub fn key(&self) -> RegistroKey {
        RegistroKey {
            date: self.date,
            shift: self.shift,
            author_id: self.author_id.clone(),
        }
    }
}

/// Groups by `(date, shift, author)`. Records without a shift (disciplines that do not track
/// one) fall into `(date, author)` groups.
pub fn group_by_shift(records: &[ProcedureRecord]) -> Vec<RegistroGroup> {
    group_with(records, ProcedureRecord::registro_key)
}

/// Groups by `(date, author)` for every discipline, ignoring shift.
pub fn group_by_day(records: &[ProcedureRecord]) -> Vec<RegistroGroup> {
    group_with(records, |record| RegistroKey {
        shift: None,
        ..record.registro_key()
    })
}

/// Groups come out most recent date first. Within a date they keep the order in which each
/// group's first record appears in `records`.
fn group_with<F>(records: &[ProcedureRecord], key_of: F) -> Vec<RegistroGroup>
where
    F: Fn(&ProcedureRecord) -> RegistroKey,
{
    let mut index: HashMap<RegistroKey, usize> = HashMap::new();
    let mut groups: Vec<RegistroGroup> = Vec::new();

    for record in records {
        let key = key_of(record);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(RegistroGroup::open(&key, record));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].absorb(record);
    }

    for group in &mut groups {
        group.total_duration_label = format_minutes(group.total_duration_minutes);
    }
    // Stable sort keeps first-appearance order for groups sharing a date.
    groups.sort_by(|left, right| right.date.cmp(&left.date));
    groups
}
