use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::grouping::group_by_shift;
use crate::workflows::procedures::{
    format_minutes, Discipline, ProcedureFilter, ProcedureRecord, Shift,
};

/// Inclusive date range the dashboard aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl MetricsWindow {
    /// The `days` calendar days ending on `today`; zero is treated as one.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let from = today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn filter(&self) -> ProcedureFilter {
        ProcedureFilter::between(self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureTally {
    pub discipline: Discipline,
    pub name: String,
    pub count: usize,
    pub total_minutes: u32,
    pub total_label: String,
}

/// Dashboard aggregate over the records inside a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardMetrics {
    pub window: MetricsWindow,
    pub total_count: usize,
    pub total_minutes: u32,
    pub total_time_label: String,
    /// Procedures per occurring shift of each type, per discipline.
    pub per_shift_average: BTreeMap<Discipline, BTreeMap<Shift, f64>>,
    /// Procedures per day with at least one record.
    pub per_day_average: f64,
    pub active_days: usize,
    /// Share of procedures linked to a patient.
    pub patient_care_ratio: f64,
    pub by_procedure: Vec<ProcedureTally>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregates `records` falling inside `window`; records outside it are ignored.
///
/// A shift type's average divides by the number of groups of that shift that actually
/// occurred, so days without that shift do not pull the average down. Each discipline
/// keeps its own shift set and is averaged on its own.
pub fn metrics(records: &[ProcedureRecord], window: MetricsWindow) -> WardMetrics {
    let in_window: Vec<ProcedureRecord> = records
        .iter()
        .filter(|record| window.contains(record.date))
        .cloned()
        .collect();

    let mut shift_totals: BTreeMap<(Discipline, Shift), (usize, usize)> = BTreeMap::new();
    for group in group_by_shift(&in_window) {
        if let Some(shift) = group.shift {
            let entry = shift_totals.entry((group.discipline, shift)).or_default();
            entry.0 += group.count;
            entry.1 += 1;
        }
    }
    let mut per_shift_average: BTreeMap<Discipline, BTreeMap<Shift, f64>> = BTreeMap::new();
    for ((discipline, shift), (procedures, groups)) in shift_totals {
        per_shift_average
            .entry(discipline)
            .or_default()
            .insert(shift, ratio(procedures, groups));
    }

    let active_days: BTreeSet<NaiveDate> = in_window.iter().map(|record| record.date).collect();
    let total_count = in_window.len();
    let total_minutes: u32 = in_window
        .iter()
        .map(|record| record.duration.minutes())
        .sum();
    let with_patient = in_window
        .iter()
        .filter(|record| record.patient_rut.is_some())
        .count();

    let mut tallies: HashMap<(Discipline, String), (usize, u32)> = HashMap::new();
    for record in &in_window {
        let entry = tallies
            .entry((record.discipline, record.name.clone()))
            .or_default();
        entry.0 += 1;
        entry.1 += record.duration.minutes();
    }
    let mut by_procedure: Vec<ProcedureTally> = tallies
        .into_iter()
        .map(|((discipline, name), (count, minutes))| ProcedureTally {
            discipline,
            name,
            count,
            total_minutes: minutes,
            total_label: format_minutes(minutes),
        })
        .collect();
    by_procedure.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.discipline.cmp(&right.discipline))
            .then_with(|| left.name.cmp(&right.name))
    });

    WardMetrics {
        window,
        total_count,
        total_minutes,
        total_time_label: format_minutes(total_minutes),
        per_shift_average,
        per_day_average: ratio(total_count, active_days.len()),
        active_days: active_days.len(),
        patient_care_ratio: ratio(with_patient, total_count),
        by_procedure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::patients::Rut;
    use crate::workflows::procedures::{ProcedureDuration, ProcedureId};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    fn kinesiology(id: u64, date: NaiveDate, author: &str) -> ProcedureRecord {
        ProcedureRecord {
            discipline: Discipline::Kinesiology,
            ..record(id, date, Shift::Night, author, "respiratory_therapy", 20, true)
        }
    }

    fn record(
        id: u64,
        date: NaiveDate,
        shift: Shift,
        author: &str,
        name: &str,
        minutes: u32,
        with_patient: bool,
    ) -> ProcedureRecord {
        ProcedureRecord {
            id: ProcedureId(id),
            discipline: Discipline::Nursing,
            name: name.to_string(),
            duration: ProcedureDuration::from_minutes(minutes).expect("valid duration"),
            date,
            shift: Some(shift),
            author_id: author.to_string(),
            author_name: author.to_string(),
            patient_rut: with_patient.then(|| Rut::parse("12345678-5").expect("valid rut")),
            observations: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn trailing_window_is_inclusive() {
        let window = MetricsWindow::trailing_days(day(30), 7);
        assert_eq!(window.from, day(24));
        assert!(window.contains(day(24)));
        assert!(window.contains(day(30)));
        assert!(!window.contains(day(23)));
        assert_eq!(MetricsWindow::trailing_days(day(30), 0).from, day(30));
    }

    #[test]
    fn shift_average_counts_only_occurring_shifts() {
        let records = vec![
            // Two day-shift groups on the 4th (two authors) and one on the 6th.
            record(1, day(4), Shift::Day, "nurse-1", "wound_care", 30, true),
            record(2, day(4), Shift::Day, "nurse-1", "blood_sampling", 10, true),
            record(3, day(4), Shift::Day, "nurse-2", "wound_care", 20, true),
            record(4, day(6), Shift::Day, "nurse-1", "wound_care", 30, true),
            record(5, day(6), Shift::Day, "nurse-1", "crash_cart_check", 15, false),
            record(6, day(6), Shift::Day, "nurse-1", "blood_sampling", 10, true),
            // A single night group.
            record(7, day(5), Shift::Night, "nurse-3", "wound_care", 45, true),
        ];

        let summary = metrics(&records, MetricsWindow::trailing_days(day(6), 30));
        let nursing = &summary.per_shift_average[&Discipline::Nursing];
        assert_eq!(nursing[&Shift::Day], 2.0);
        assert_eq!(nursing[&Shift::Night], 1.0);
        assert!(!nursing.contains_key(&Shift::Morning));
        assert_eq!(summary.active_days, 3);
        assert!((summary.per_day_average - 7.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.total_count, 7);
        assert_eq!(summary.total_minutes, 160);
        assert_eq!(summary.total_time_label, "2h 40m");
        assert!((summary.patient_care_ratio - 6.0 / 7.0).abs() < 1e-9);
        assert_eq!(summary.by_procedure[0].name, "wound_care");
        assert_eq!(summary.by_procedure[0].count, 4);
        assert_eq!(summary.by_procedure[0].total_label, "2h 5m");
    }

    #[test]
    fn shift_averages_stay_within_each_discipline() {
        let records = vec![
            record(1, day(4), Shift::Night, "nurse-1", "wound_care", 30, true),
            record(2, day(4), Shift::Night, "nurse-1", "blood_sampling", 10, true),
            record(3, day(4), Shift::Night, "nurse-1", "central_line_care", 20, true),
            kinesiology(4, day(4), "kine-1"),
            kinesiology(5, day(5), "kine-1"),
        ];

        let summary = metrics(&records, MetricsWindow::trailing_days(day(5), 7));
        assert_eq!(summary.per_shift_average[&Discipline::Nursing][&Shift::Night], 3.0);
        assert_eq!(
            summary.per_shift_average[&Discipline::Kinesiology][&Shift::Night],
            1.0
        );
        assert!(!summary.per_shift_average.contains_key(&Discipline::Medicine));
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let records = vec![
            record(1, day(1), Shift::Day, "nurse-1", "wound_care", 30, true),
            record(2, day(10), Shift::Day, "nurse-1", "wound_care", 30, true),
        ];
        let summary = metrics(&records, MetricsWindow::trailing_days(day(10), 3));
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.total_minutes, 30);
    }

    #[test]
    fn empty_window_reports_zeroes() {
        let summary = metrics(&[], MetricsWindow::trailing_days(day(10), 30));
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.total_time_label, "0m");
        assert_eq!(summary.per_day_average, 0.0);
        assert_eq!(summary.patient_care_ratio, 0.0);
        assert!(summary.per_shift_average.is_empty());
        assert!(summary.by_procedure.is_empty());
    }

    #[test]
    fn totals_beyond_a_day_keep_counting_hours() {
        let records: Vec<_> = (0..3)
            .map(|id| record(id, day(4), Shift::Night, "nurse-1", "wound_care", 600, true))
            .collect();
        let summary = metrics(&records, MetricsWindow::trailing_days(day(4), 1));
        assert_eq!(summary.total_minutes, 1800);
        assert_eq!(summary.total_time_label, "30h");
    }
}
