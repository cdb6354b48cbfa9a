// src/modules/records/user_interface.rs
use std::io;

use itertools::Itertools;

use super::model::{Doctor, Gender, NewDoctor, NewPatient, Patient};
use super::{add_doctor, add_patient, doctor_names, list_doctors, list_patients, RecordError};
use crate::modules::storage::RecordStore;
use crate::modules::utils::io::{prompt, select_option};
use crate::modules::utils::logging::log_data_operation;
use crate::MAX_PATIENT_AGE;

const NO_DOCTOR_AVAILABLE: &str = "No doctor available";

/// Card shown for one patient in the listing
pub fn render_patient(patient: &Patient) -> String {
    format!(
        "Patient #{} - {}\n  Age: {}, Gender: {}\n  City: {}, Doctor: {}\n  Added on: {}",
        patient.id,
        patient.name,
        patient.age,
        patient.gender,
        patient.city,
        patient.doctor,
        patient.timestamp
    )
}

/// Card shown for one doctor in the listing
pub fn render_doctor(doctor: &Doctor) -> String {
    format!(
        "Doctor #{} - {}\n  Specialization: {}\n  City: {}\n  Added on: {}",
        doctor.id, doctor.name, doctor.specialization, doctor.city, doctor.timestamp
    )
}

fn read_age() -> io::Result<u8> {
    loop {
        let input = prompt(&format!("Age (0-{})", MAX_PATIENT_AGE))?;
        match input.parse::<u8>() {
            Ok(age) if age <= MAX_PATIENT_AGE => return Ok(age),
            _ => println!("Invalid age. Please enter a number between 0 and {}.", MAX_PATIENT_AGE),
        }
    }
}

/// Collect the add-patient form
pub fn prompt_new_patient(doctors: &[String]) -> io::Result<NewPatient> {
    let name = prompt("Patient Name")?;
    let age = read_age()?;

    let gender_labels: Vec<&str> = Gender::ALL.iter().map(|g| g.label()).collect();
    let gender = loop {
        match select_option("Gender", &gender_labels)? {
            Some(index) => break Gender::ALL[index],
            None => println!("Invalid choice. Please pick 1-{}.", gender_labels.len()),
        }
    };

    let city = prompt("City")?;

    let doctor = if doctors.is_empty() {
        println!("\nAssign Doctor: {}", NO_DOCTOR_AVAILABLE);
        None
    } else {
        select_option("Assign Doctor", doctors)?.map(|index| doctors[index].clone())
    };

    Ok(NewPatient {
        name,
        age,
        gender,
        city,
        doctor,
    })
}

/// Collect the add-doctor form
pub fn prompt_new_doctor() -> io::Result<NewDoctor> {
    Ok(NewDoctor {
        name: prompt("Doctor Name")?,
        specialization: prompt("Specialization")?,
        city: prompt("City")?,
    })
}

fn report_failure(error: &RecordError, username: &str, resource: &str) {
    match error {
        RecordError::ValidationFailure(fields) => {
            let hint = if resource == "patients" {
                "Please fill all fields and select a doctor."
            } else {
                "Please fill all fields."
            };
            println!("\n⚠ {} Missing: {}", hint, fields.iter().join(", "));
            log_data_operation("add", username, resource, false, Some("validation failed"));
        }
        RecordError::Storage(e) => {
            println!("\nError saving record: {}", e);
            log_data_operation("add", username, resource, false, Some(&e.to_string()));
        }
    }
}

/// Handle the 'Add Patient' page
pub fn handle_add_patient(store: &RecordStore, username: &str) -> io::Result<()> {
    println!("\n=== Add New Patient ===");

    let doctors = match doctor_names(store) {
        Ok(doctors) => doctors,
        Err(e) => {
            println!("Error loading doctors: {}", e);
            return Ok(());
        }
    };

    let form = prompt_new_patient(&doctors)?;
    match add_patient(store, form) {
        Ok(patient) => {
            println!(
                "\n✅ Patient {} added successfully with ID {}!",
                patient.name, patient.id
            );
            log_data_operation("add", username, "patients", true, None);
        }
        Err(e) => report_failure(&e, username, "patients"),
    }
    Ok(())
}

/// Handle the 'Add Doctor' page
pub fn handle_add_doctor(store: &RecordStore, username: &str) -> io::Result<()> {
    println!("\n=== Add New Doctor ===");

    let form = prompt_new_doctor()?;
    match add_doctor(store, form) {
        Ok(doctor) => {
            println!(
                "\n✅ Doctor {} added successfully with ID {}!",
                doctor.name, doctor.id
            );
            log_data_operation("add", username, "doctors", true, None);
        }
        Err(e) => report_failure(&e, username, "doctors"),
    }
    Ok(())
}

/// Handle the 'View Patients' page
pub fn handle_view_patients(store: &RecordStore) -> io::Result<()> {
    println!("\n=== All Patients ===");

    match list_patients(store, "") {
        Ok(all) if all.is_empty() => {
            println!("No patient records found.");
            return Ok(());
        }
        Ok(_) => {}
        Err(e) => {
            println!("Error loading patients: {}", e);
            return Ok(());
        }
    }

    let query = prompt("Search by Name (press Enter to show all)")?;
    match list_patients(store, &query) {
        Ok(patients) => {
            for patient in &patients {
                println!("\n{}", render_patient(patient));
            }
            println!("\n{} patient(s) shown.", patients.len());
        }
        Err(e) => println!("Error loading patients: {}", e),
    }
    Ok(())
}

/// Handle the 'View Doctors' page
pub fn handle_view_doctors(store: &RecordStore) -> io::Result<()> {
    println!("\n=== All Doctors ===");

    match list_doctors(store, "") {
        Ok(all) if all.is_empty() => {
            println!("No doctor records found.");
            return Ok(());
        }
        Ok(_) => {}
        Err(e) => {
            println!("Error loading doctors: {}", e);
            return Ok(());
        }
    }

    let query = prompt("Search by Name (press Enter to show all)")?;
    match list_doctors(store, &query) {
        Ok(doctors) => {
            for doctor in &doctors {
                println!("\n{}", render_doctor(doctor));
            }
            println!("\n{} doctor(s) shown.", doctors.len());
        }
        Err(e) => println!("Error loading doctors: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_patient_card() {
        let patient = Patient {
            id: 3,
            name: "Ann".to_string(),
            age: 34,
            gender: Gender::Female,
            city: "Pune".to_string(),
            doctor: "Dr. Rao".to_string(),
            timestamp: "2024-05-01 10:00:00.000000".to_string(),
        };

        let card = render_patient(&patient);
        assert!(card.starts_with("Patient #3 - Ann"));
        assert!(card.contains("Age: 34, Gender: Female"));
        assert!(card.contains("City: Pune, Doctor: Dr. Rao"));
        assert!(card.ends_with("Added on: 2024-05-01 10:00:00.000000"));
    }

    #[test]
    fn test_render_doctor_card() {
        let doctor = Doctor {
            id: 1,
            name: "Dr. Rao".to_string(),
            specialization: "Cardiology".to_string(),
            city: "Pune".to_string(),
            timestamp: "t".to_string(),
        };

        assert_eq!(
            render_doctor(&doctor),
            "Doctor #1 - Dr. Rao\n  Specialization: Cardiology\n  City: Pune\n  Added on: t"
        );
    }
}
