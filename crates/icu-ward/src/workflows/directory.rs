//! Process-local patient directory, optionally seeded from an admissions CSV export.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;

use tracing::{error, info};

use super::patients::{DirectoryError, PatientDirectory, PatientSnapshot, Rut};

#[derive(Debug)]
pub enum PatientSeedError {
    Io(std::io::Error),
    Csv(csv::Error),
    Directory(DirectoryError),
}

impl std::fmt::Display for PatientSeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatientSeedError::Io(err) => write!(f, "failed to read patient seed: {}", err),
            PatientSeedError::Csv(err) => write!(f, "invalid patient seed data: {}", err),
            PatientSeedError::Directory(err) => write!(f, "failed to store seeded patient: {}", err),
        }
    }
}

impl std::error::Error for PatientSeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatientSeedError::Io(err) => Some(err),
            PatientSeedError::Csv(err) => Some(err),
            PatientSeedError::Directory(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PatientSeedError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PatientSeedError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<DirectoryError> for PatientSeedError {
    fn from(err: DirectoryError) -> Self {
        Self::Directory(err)
    }
}

#[derive(Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<HashMap<Rut, PatientSnapshot>>,
}

impl InMemoryPatientDirectory {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PatientSeedError> {
        let file = std::fs::File::open(path.as_ref())?;
        let directory = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            patients = directory.len(),
            "patient directory seeded"
        );
        Ok(directory)
    }

    /// Reads `rut,bed_number,admission_date,discharge_date,birth_date` rows. Blank bed or
    /// discharge cells mean unassigned and still admitted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PatientSeedError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let directory = Self::default();
        for row in csv_reader.deserialize::<PatientSnapshot>() {
            directory.admit(row?)?;
        }
        Ok(directory)
    }

    /// Registers or replaces a patient snapshot.
    pub fn admit(&self, patient: PatientSnapshot) -> Result<(), DirectoryError> {
        let mut patients = self.patients.write().map_err(|_| {
            error!(rut = %patient.rut, "patient directory poisoned; admission dropped");
            DirectoryError::Unavailable("patient directory poisoned".into())
        })?;
        patients.insert(patient.rut.clone(), patient);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patients.read().map(|patients| patients.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PatientDirectory for InMemoryPatientDirectory {
    fn patient(&self, rut: &Rut) -> Result<Option<PatientSnapshot>, DirectoryError> {
        let patients = self
            .patients
            .read()
            .map_err(|_| DirectoryError::Unavailable("patient directory poisoned".into()))?;
        Ok(patients.get(rut).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SEED: &str = "\
rut,bed_number,admission_date,discharge_date,birth_date
12.345.678-5, 4, 2024-01-10, , 1956-03-02
10000013-k, , 2024-02-01, 2024-02-09, 1990-11-30
";

    #[test]
    fn loads_rows_with_optional_cells() {
        let directory = InMemoryPatientDirectory::from_reader(SEED.as_bytes()).expect("seed");
        assert_eq!(directory.len(), 2);

        let rut = Rut::parse("12345678-5").expect("valid rut");
        let patient = directory.patient(&rut).expect("lookup").expect("present");
        assert_eq!(patient.bed_number, Some(4));
        assert!(patient.is_hospitalized());
        assert_eq!(
            patient.admission_date,
            NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date")
        );

        let discharged = directory
            .patient(&Rut::parse("10000013-K").expect("valid rut"))
            .expect("lookup")
            .expect("present");
        assert_eq!(discharged.bed_number, None);
        assert!(!discharged.is_hospitalized());
    }

    #[test]
    fn rejects_rows_with_invalid_rut() {
        let seed = "rut,bed_number,admission_date,discharge_date,birth_date\n\
                    12345678-9,1,2024-01-10,,1956-03-02\n";
        assert!(matches!(
            InMemoryPatientDirectory::from_reader(seed.as_bytes()),
            Err(PatientSeedError::Csv(_))
        ));
    }

    #[test]
    fn admission_into_a_poisoned_directory_is_reported() {
        let directory = InMemoryPatientDirectory::default();
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = directory.patients.write().expect("write lock");
            panic!("poison the directory lock");
        }));
        assert!(poisoned.is_err());

        let patient = PatientSnapshot {
            rut: Rut::parse("12345678-5").expect("valid rut"),
            bed_number: Some(1),
            admission_date: NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
            discharge_date: None,
            birth_date: NaiveDate::from_ymd_opt(1956, 3, 2).expect("valid date"),
        };
        assert!(matches!(
            directory.admit(patient),
            Err(DirectoryError::Unavailable(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            InMemoryPatientDirectory::from_path("/nonexistent/patients.csv"),
            Err(PatientSeedError::Io(_))
        ));
    }
}
