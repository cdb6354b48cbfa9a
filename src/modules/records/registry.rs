use std::collections::BTreeMap;

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::{Doctor, Named, NewDoctor, NewPatient, Patient};
use super::RecordError;
use crate::modules::storage::{RecordStore, Slot, StoreError};
use crate::modules::utils::time::record_timestamp;

/// Content of the counters slot: collection name -> last id handed out
pub type Counters = BTreeMap<String, u32>;

/// Next id for a collection.
///
/// The persisted counter never goes backwards, and it is raised to the
/// current record count first so data written before counters existed keeps
/// numbering from `len + 1`.
fn next_id(counters: &mut Counters, collection: Slot, current_len: usize) -> u32 {
    let current_len = u32::try_from(current_len).unwrap_or(u32::MAX);
    let last = counters.entry(collection.to_string()).or_insert(0);
    *last = (*last).max(current_len).saturating_add(1);
    *last
}

/// Append one record to a collection under its writer lock.
///
/// The collection is saved before the counter. A failed collection save
/// leaves the counter untouched, and a failed counter save is caught up by
/// `next_id` on the next append.
fn append_record<T, F>(store: &RecordStore, collection: Slot, build: F) -> Result<(T, usize), StoreError>
where
    T: Serialize + DeserializeOwned + Clone,
    F: FnOnce(u32) -> T,
{
    let slot = store.lock(collection);
    let mut records: Vec<T> = slot.load()?;

    let counters_slot = store.lock(Slot::Counters);
    let mut counters: Counters = counters_slot.load()?;
    let id = next_id(&mut counters, collection, records.len());

    let record = build(id);
    records.push(record.clone());
    slot.save(&records)?;
    counters_slot.save(&counters)?;

    Ok((record, records.len()))
}

/// Validate and append a doctor, returning the stored record
pub fn add_doctor(store: &RecordStore, form: NewDoctor) -> Result<Doctor, RecordError> {
    form.validate()?;

    let (doctor, count) = append_record(store, Slot::Doctors, |id| {
        form.into_record(id, record_timestamp())
    })?;

    info!("Doctor #{} added ({} on record)", doctor.id, count);
    Ok(doctor)
}

/// Validate and append a patient; the assigned doctor must already exist
pub fn add_patient(store: &RecordStore, form: NewPatient) -> Result<Patient, RecordError> {
    form.validate(&doctor_names(store)?)?;

    let (patient, count) = append_record(store, Slot::Patients, |id| {
        form.into_record(id, record_timestamp())
    })?;

    info!("Patient #{} added ({} on record)", patient.id, count);
    Ok(patient)
}

/// Names offered by the doctor selection list, in insertion order
pub fn doctor_names(store: &RecordStore) -> Result<Vec<String>, StoreError> {
    let doctors: Vec<Doctor> = store.load(Slot::Doctors)?;
    Ok(doctors.into_iter().map(|d| d.name).collect())
}

pub fn list_patients(store: &RecordStore, query: &str) -> Result<Vec<Patient>, StoreError> {
    Ok(filter_by_name(store.load(Slot::Patients)?, query))
}

pub fn list_doctors(store: &RecordStore, query: &str) -> Result<Vec<Doctor>, StoreError> {
    Ok(filter_by_name(store.load(Slot::Doctors)?, query))
}

/// Case-insensitive substring match on the name; an empty query keeps everything
pub fn filter_by_name<T: Named>(records: Vec<T>, query: &str) -> Vec<T> {
    let needle = query.to_lowercase();
    records
        .into_iter()
        .filter(|record| record.name().to_lowercase().contains(&needle))
        .collect()
}
