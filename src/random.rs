//! Secure random bytes, hex strings and generated keys.

use rand_core::{OsRng, RngCore};

use crate::error::RandomError;

/// Default length for [`generate_key`].
pub const DEFAULT_GENERATED_KEY_BYTES: usize = 56;

/// Source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), RandomError>;

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>, RandomError> {
        let mut out = vec![0u8; length];
        self.fill(&mut out)?;
        Ok(out)
    }

    /// Hex encoding of `length` random bytes (so `2 * length` characters).
    fn random_string(&self, length: usize) -> Result<String, RandomError> {
        self.random_bytes(length).map(hex::encode)
    }
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), RandomError> {
        OsRng.try_fill_bytes(dest).map_err(|_| RandomError)
    }
}

pub fn random_bytes(length: usize) -> Result<Vec<u8>, RandomError> {
    OsRandom.random_bytes(length)
}

pub fn random_string(length: usize) -> Result<String, RandomError> {
    OsRandom.random_string(length)
}

/// Fresh random key material, e.g. for use as a passphrase.
pub fn generate_key(length: usize) -> Result<Vec<u8>, RandomError> {
    random_bytes(length)
}
