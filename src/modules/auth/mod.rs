pub mod credentials;
pub mod error;
pub mod password;
pub mod session;
pub mod user_interface;

// Re-export the main types and functions
pub use credentials::{CredentialMap, CredentialService};
pub use error::AuthError;
pub use password::{PasswordHasher, StoredCredential};
pub use session::{Session, SessionController};
