// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, config, records, storage, utils};

// Re-export commonly used types
pub use modules::auth::credentials::CredentialService;
pub use modules::auth::session::{Session, SessionController};
pub use modules::config::AppConfig;
pub use modules::records::model::{Doctor, Gender, Patient};
pub use modules::storage::{RecordStore, Slot, StoreError};

// Constants
pub const USERS_FILE: &str = "users.json";
pub const PATIENTS_FILE: &str = "patients.json";
pub const DOCTORS_FILE: &str = "doctors.json";
pub const COUNTERS_FILE: &str = "counters.json";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "application.log";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
pub const MAX_PATIENT_AGE: u8 = 120;

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
