use std::io::Write;

use serde::Serialize;

use super::grouping::RegistroGroup;

#[derive(Debug)]
pub enum ReportExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ReportExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportExportError::Io(err) => write!(f, "failed to write shift report: {}", err),
            ReportExportError::Csv(err) => write!(f, "failed to encode shift report: {}", err),
        }
    }
}

impl std::error::Error for ReportExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportExportError::Io(err) => Some(err),
            ReportExportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ReportExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReportExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub const SHIFT_REPORT_HEADER: [&str; 9] = [
    "Date",
    "Shift",
    "Discipline",
    "Author ID",
    "Author",
    "Procedures",
    "With Patient",
    "Total Minutes",
    "Total Time",
];

/// Field order matches `SHIFT_REPORT_HEADER`.
#[derive(Debug, Serialize)]
struct ShiftReportRow<'a> {
    date: String,
    shift: &'static str,
    discipline: &'static str,
    author_id: &'a str,
    author_name: &'a str,
    count: usize,
    patient_count: usize,
    total_minutes: u32,
    total_label: &'a str,
}

impl<'a> From<&'a RegistroGroup> for ShiftReportRow<'a> {
    fn from(group: &'a RegistroGroup) -> Self {
        Self {
            date: group.date.format("%Y-%m-%d").to_string(),
            shift: group.shift.map_or("", |shift| shift.label()),
            discipline: group.discipline.label(),
            author_id: &group.author_id,
            author_name: &group.author_name,
            count: group.count,
            patient_count: group.patient_count,
            total_minutes: group.total_duration_minutes,
            total_label: &group.total_duration_label,
        }
    }
}

/// Writes the header and one CSV row per registro group, in the order given. The header is
/// written even when there are no groups.
pub fn write_shift_report<W: Write>(
    groups: &[RegistroGroup],
    writer: W,
) -> Result<(), ReportExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(SHIFT_REPORT_HEADER)?;
    for group in groups {
        csv_writer.serialize(ShiftReportRow::from(group))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn render_shift_report(groups: &[RegistroGroup]) -> Result<String, ReportExportError> {
    let mut buffer = Vec::new();
    write_shift_report(groups, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err).into())
}
