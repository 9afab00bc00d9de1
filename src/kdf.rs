//! Passphrase → key derivation.
//!
//! chunks = passphrase split into 4-byte pieces (last may be shorter)
//! key    = HMAC-SHA256(salt, len(c0) || c0 || len(c1) || c1 || ...)
//!
//! The salt is installation-wide: the same passphrase yields a different key
//! under a different salt.

use core::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::CipherSpec;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Derived key size (SHA-256 output).
pub const KEY_BYTES: usize = 32;

/// Passphrase chunk size fed to the keyed hash.
pub const CHUNK_BYTES: usize = 4;

/// Salt used when the installation does not configure one.
pub const DEFAULT_SALT: &str = "guard-envelope|salt|v1";

pub(crate) fn keyed_hmac(key: &[u8]) -> HmacSha256 {
    let Ok(mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Fixed-length symmetric key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_BYTES]);

impl Key {
    pub fn from_bytes(bytes: [u8; KEY_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }

    /// Leading `spec.key_len()` bytes, as handed to the block cipher.
    pub(crate) fn for_cipher(&self, spec: CipherSpec) -> &[u8] {
        &self.0[..spec.key_len().min(KEY_BYTES)]
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Deriver
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct KeyDeriver {
    salt: Vec<u8>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_SALT)
    }
}

impl KeyDeriver {
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Self {
            salt: salt.as_ref().to_vec(),
        }
    }

    pub fn derive(&self, passphrase: &[u8]) -> Key {
        let mut mac = keyed_hmac(&self.salt);
        for chunk in passphrase.chunks(CHUNK_BYTES) {
            mac.update(&[chunk.len() as u8]);
            mac.update(chunk);
        }

        let mut out = [0u8; KEY_BYTES];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Key(out)
    }
}
