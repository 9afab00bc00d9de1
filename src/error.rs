//! Error types for Guard Envelope.
//!
//! One type per failure stage, unified by [`GuardError`]. Decryption failures
//! carry a sub-reason so callers (and tests) can tell a malformed envelope
//! from a MAC mismatch, but every one of them is still a `DecryptionError`.

use thiserror::Error;

/// Missing or invalid key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("empty key")]
    Empty,
    #[error("key has not been set")]
    NotSet,
    #[error("master key has not been set yet")]
    MasterKeyUnset,
    #[error("master key was generated but the store refused it")]
    MasterKeyRejected,
    #[error("key store: {0}")]
    Store(#[from] StoreError),
}

/// The configured algorithm is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("cipher method not supported: {0}")]
    Unsupported(String),
}

/// Failure while building a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncryptionError {
    #[error("could not encrypt the data")]
    Primitive,
    #[error("random source unavailable")]
    Random,
    #[error("could not serialize the data")]
    Serialize,
    #[error("could not encode the envelope")]
    Encoding,
}

/// Failure while opening a token. Nothing is decrypted unless the MAC
/// verified first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptionError {
    #[error("malformed envelope")]
    MalformedEnvelope,
    #[error("invalid MAC")]
    MacMismatch,
    #[error("could not decrypt the data")]
    CipherFailure,
    #[error("could not unserialize the data")]
    Unserialize,
}

/// Opaque failure reported by a [`crate::CipherPrimitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cipher primitive failure")]
pub struct PrimitiveError;

/// The random source could not produce bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("random source failure")]
pub struct RandomError;

/// Failure inside a [`crate::KeyValueStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("salt must not be empty")]
    EmptySalt,
    #[error("invalid config document: {0}")]
    Parse(String),
}

/// Any error surfaced by the [`crate::Guard`] facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
}

impl From<RandomError> for EncryptionError {
    fn from(_: RandomError) -> Self {
        EncryptionError::Random
    }
}

impl GuardError {
    /// The decryption sub-reason, if this is a decryption failure.
    pub fn decryption_reason(&self) -> Option<DecryptionError> {
        match self {
            Self::Decryption(e) => Some(*e),
            _ => None,
        }
    }
}
