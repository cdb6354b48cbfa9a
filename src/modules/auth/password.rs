use std::io;

use pbkdf2::pbkdf2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{HmacSha256, DEFAULT_HASH_ITERATIONS};

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Password digest as persisted in the users slot.
///
/// New accounts always get the salted form. A bare hex string is the
/// unsalted SHA-256 digest written by older deployments; it is still
/// accepted for verification but never produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoredCredential {
    Salted {
        salt: String,
        hash: String,
        iterations: u32,
    },
    Legacy(String),
}

impl StoredCredential {
    /// Recompute the digest for `password` and compare it with the stored one
    pub fn matches(&self, password: &str) -> bool {
        match self {
            StoredCredential::Salted {
                salt,
                hash,
                iterations,
            } => {
                if *iterations == 0 {
                    return false;
                }
                let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(hash)) else {
                    return false;
                };
                let actual = derive_key_from_passphrase(password, &salt, *iterations);
                constant_time_eq(&actual, &expected)
            }
            StoredCredential::Legacy(digest) => {
                let actual = legacy_digest(password);
                constant_time_eq(actual.as_bytes(), digest.to_ascii_lowercase().as_bytes())
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredCredential::Legacy(_))
    }
}

/// Salted PBKDF2-HMAC-SHA256 hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> StoredCredential {
        let salt = generate_random_salt();
        self.hash_with_salt(password, &salt)
    }

    /// Deterministic variant; same password and salt give the same digest
    pub fn hash_with_salt(&self, password: &str, salt: &[u8]) -> StoredCredential {
        let digest = derive_key_from_passphrase(password, salt, self.iterations);
        StoredCredential::Salted {
            salt: hex::encode(salt),
            hash: hex::encode(digest),
            iterations: self.iterations,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_ITERATIONS)
    }
}

/// Function to generate a random salt for PBKDF2
pub fn generate_random_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Function to derive a 32-byte key from the passphrase using PBKDF2
pub fn derive_key_from_passphrase(passphrase: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut key = vec![0u8; DIGEST_LEN];
    pbkdf2::<HmacSha256>(passphrase.as_bytes(), salt, iterations, &mut key);
    key
}

/// Unsalted SHA-256 hex digest used by legacy user files
pub fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Helper function to read a password securely
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}
