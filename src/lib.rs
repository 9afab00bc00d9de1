//! # Guard Envelope
//!
//! Authenticated symmetric encryption for data at rest: a passphrase-derived
//! key, a CBC block cipher, and an HMAC-SHA-256 tag packed into one
//! self-describing token.
//!
//! ## Quick Start
//!
//! ```rust
//! use guard_envelope::Guard;
//!
//! let mut guard = Guard::new("AES-256-CBC");
//! guard.set_key("correct horse battery staple").unwrap();
//!
//! let token = guard.encrypt_string("hello world").unwrap();
//! let plaintext = guard.decrypt_string(&token).unwrap();
//!
//! assert_eq!(plaintext, "hello world");
//! ```
//!
//! ## Security Properties
//!
//! - **Verify-then-decrypt**: structure, then MAC, then cipher; never the reverse
//! - **Constant-time MAC check**: `subtle` comparison of the full tag
//! - **Fresh IV per call**: identical inputs never produce identical tokens
//! - **Distinct failures**: `KeyError`, `CipherError`, `EncryptionError`,
//!   `DecryptionError` (with a sub-reason)
//!
//! ## What's NOT Provided
//!
//! - Key exchange or transport
//! - Multiple recipients
//! - Streaming encryption
//! - A versioned MAC-key derivation (the MAC key is `salt || key || iv`)

#![deny(unsafe_code)]

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

mod cipher;
mod config;
mod error;
mod guard;
mod kdf;
mod mac;
mod master;
mod random;

// Wire module is public for the CLI inspect command and fuzzing
pub mod wire;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

pub use cipher::{supported, CbcPrimitive, CipherPrimitive, CipherSpec};
pub use config::{GuardConfig, ENV_CIPHER, ENV_SALT};
pub use error::{
    CipherError, ConfigError, DecryptionError, EncryptionError, GuardError, KeyError,
    PrimitiveError, RandomError, StoreError,
};
pub use guard::{Guard, DEFAULT_CIPHER};
pub use kdf::{Key, KeyDeriver, CHUNK_BYTES, DEFAULT_SALT, KEY_BYTES};
pub use mac::{MacAuthenticator, Tag, MAC_BYTES};
pub use master::{InMemoryStore, KeyValueStore, MasterKey, MASTER_KEY_BYTES};
pub use random::{
    generate_key, random_bytes, random_string, OsRandom, RandomSource,
    DEFAULT_GENERATED_KEY_BYTES,
};
pub use wire::{Envelope, Token};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
