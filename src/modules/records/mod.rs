pub mod model;
pub mod registry;
pub mod user_interface;

use thiserror::Error;

use crate::modules::storage::StoreError;

pub use model::{Doctor, Gender, Named, NewDoctor, NewPatient, Patient};
pub use registry::{
    add_doctor, add_patient, doctor_names, filter_by_name, list_doctors, list_patients,
};

/// Custom error type for record operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("please fill all fields (missing: {})", .0.join(", "))]
    ValidationFailure(Vec<&'static str>),
    #[error(transparent)]
    Storage(#[from] StoreError),
}
