use std::fmt;

use serde::{Deserialize, Serialize};

use super::RecordError;
use crate::MAX_PATIENT_AGE;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Records that can be searched by name
pub trait Named {
    fn name(&self) -> &str;
}

/// A stored patient; `doctor` is a copy of the doctor's name, not a reference
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: u32,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub city: String,
    pub doctor: String,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Doctor {
    pub id: u32,
    pub name: String,
    pub specialization: String,
    pub city: String,
    pub timestamp: String,
}

impl Named for Patient {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Doctor {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Field values collected by the add-patient form
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub city: String,
    pub doctor: Option<String>,
}

impl NewPatient {
    /// Check required fields against the doctors currently on record
    pub fn validate(&self, doctor_names: &[String]) -> Result<(), RecordError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.age > MAX_PATIENT_AGE {
            missing.push("age");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if doctor_names.is_empty() {
            missing.push("doctor (no doctors available)");
        } else {
            match &self.doctor {
                Some(doctor) if doctor_names.contains(doctor) => {}
                _ => missing.push("doctor"),
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecordError::ValidationFailure(missing))
        }
    }

    pub fn into_record(self, id: u32, timestamp: String) -> Patient {
        Patient {
            id,
            name: self.name,
            age: self.age,
            gender: self.gender,
            city: self.city,
            doctor: self.doctor.unwrap_or_default(),
            timestamp,
        }
    }
}

/// Field values collected by the add-doctor form
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub city: String,
}

impl NewDoctor {
    pub fn validate(&self) -> Result<(), RecordError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("specialization", &self.specialization),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecordError::ValidationFailure(missing))
        }
    }

    pub fn into_record(self, id: u32, timestamp: String) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialization: self.specialization,
            city: self.city,
            timestamp,
        }
    }
}
