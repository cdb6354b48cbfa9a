use thiserror::Error;

use crate::modules::storage::StoreError;

/// Outcomes of the signup and login flows that the user has to see
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("please fill all fields (missing: {})", .0.join(", "))]
    ValidationFailure(Vec<&'static str>),
    #[error("username '{0}' already exists")]
    DuplicateAccount(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("already logged in as '{0}'")]
    AlreadyAuthenticated(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}
